use std::slice;

use super::node::ContentNode;
use crate::model::ids::LessonId;

/// A node of a chapter/lesson tree that exposes its children.
///
/// Implemented by the plain content tree and by the completion-augmented
/// tree, so the same traversal serves both.
pub trait TreeNode: Sized {
    /// Child nodes in display order; empty for leaves.
    fn children(&self) -> &[Self];
}

impl TreeNode for ContentNode {
    fn children(&self) -> &[Self] {
        match self {
            ContentNode::Chapter(chapter) => &chapter.children,
            ContentNode::Lesson(_) => &[],
        }
    }
}

/// Pre-order, depth-first, left-to-right iterator over a tree.
///
/// Holds one slice iterator per open level instead of recursing.
pub struct PreOrder<'a, T> {
    stack: Vec<slice::Iter<'a, T>>,
}

impl<'a, T: TreeNode> PreOrder<'a, T> {
    #[must_use]
    pub fn new(nodes: &'a [T]) -> Self {
        Self {
            stack: vec![nodes.iter()],
        }
    }
}

impl<'a, T: TreeNode> Iterator for PreOrder<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(node) => {
                    let children = node.children();
                    if !children.is_empty() {
                        self.stack.push(children.iter());
                    }
                    return Some(node);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Calls `visit` exactly once for every node, parents before their children.
///
/// ```
/// use course_core::model::content::{
///     create_chapter, create_lesson, traverse_course_content, ContentNode,
/// };
///
/// let content = vec![create_chapter("A", vec![create_lesson("l1")], None)];
/// let (mut chapters, mut lessons) = (0, 0);
/// traverse_course_content(&content, |node: &ContentNode| {
///     if node.is_chapter() { chapters += 1 } else { lessons += 1 }
/// });
/// assert_eq!((chapters, lessons), (1, 1));
/// ```
pub fn traverse_course_content<'a, T, F>(content: &'a [T], mut visit: F)
where
    T: TreeNode,
    F: FnMut(&'a T),
{
    for node in PreOrder::new(content) {
        visit(node);
    }
}

/// Lesson ids of the whole tree in traversal order.
#[must_use]
pub fn extract_lesson_ids(content: &[ContentNode]) -> Vec<LessonId> {
    PreOrder::new(content)
        .filter_map(ContentNode::as_lesson)
        .map(|lesson| lesson.lesson_id.clone())
        .collect()
}

/// Total number of lessons, including nested ones.
#[must_use]
pub fn count_lessons(content: &[ContentNode]) -> usize {
    PreOrder::new(content)
        .filter(|node| !node.is_chapter())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::content::{
        CourseContent, create_chapter, create_course_content, create_lesson,
    };

    fn sample() -> CourseContent {
        create_course_content(vec![
            create_chapter("A", vec![create_lesson("l1"), create_lesson("l2")], None),
            create_chapter(
                "B",
                vec![create_chapter("B1", vec![create_lesson("l3")], None)],
                None,
            ),
        ])
    }

    fn label(node: &ContentNode) -> String {
        match node {
            ContentNode::Chapter(ch) => format!("chapter {}", ch.title),
            ContentNode::Lesson(l) => format!("lesson {}", l.lesson_id),
        }
    }

    #[test]
    fn visits_parents_before_children() {
        let content = sample();
        let mut seen = Vec::new();
        traverse_course_content(&content, |node| seen.push(label(node)));

        assert_eq!(
            seen,
            vec![
                "chapter A",
                "lesson l1",
                "lesson l2",
                "chapter B",
                "chapter B1",
                "lesson l3",
            ]
        );
    }

    #[test]
    fn counts_chapters_and_lessons() {
        let content = sample();
        let mut chapters = 0;
        let mut lessons = 0;
        traverse_course_content(&content, |node: &ContentNode| {
            if node.is_chapter() {
                chapters += 1;
            } else {
                lessons += 1;
            }
        });

        assert_eq!(chapters, 3);
        assert_eq!(lessons, 3);
        assert_eq!(count_lessons(&content), 3);
    }

    #[test]
    fn empty_tree_visits_nothing() {
        let content: CourseContent = Vec::new();
        let mut calls = 0;
        traverse_course_content(&content, |_| calls += 1);
        assert_eq!(calls, 0);
        assert!(extract_lesson_ids(&content).is_empty());
    }

    #[test]
    fn empty_chapters_are_still_visited() {
        let content = vec![
            create_chapter("empty", vec![], None),
            create_chapter("nested", vec![create_chapter("inner", vec![], None)], None),
        ];
        assert_eq!(PreOrder::new(&content).count(), 3);
    }

    #[test]
    fn extracts_ids_in_traversal_order() {
        let content = sample();
        let ids = extract_lesson_ids(&content);
        let ids: Vec<&str> = ids.iter().map(LessonId::as_str).collect();
        assert_eq!(ids, vec!["l1", "l2", "l3"]);
    }

    #[test]
    fn extraction_matches_visited_lessons() {
        let content = vec![
            create_lesson("first"),
            create_chapter(
                "x",
                vec![
                    create_chapter("y", vec![create_lesson("deep")], None),
                    create_lesson("after-deep"),
                ],
                None,
            ),
            create_lesson("last"),
        ];

        let mut visited = Vec::new();
        traverse_course_content(&content, |node: &ContentNode| {
            if let Some(lesson) = node.as_lesson() {
                visited.push(lesson.lesson_id.clone());
            }
        });

        assert_eq!(extract_lesson_ids(&content), visited);
    }
}

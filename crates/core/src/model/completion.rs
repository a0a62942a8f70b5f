use std::collections::{BTreeSet, HashSet};
use std::hash::BuildHasher;

use serde::{Deserialize, Serialize};

use crate::model::content::{ContentNode, PreOrder, TreeNode};
use crate::model::ids::LessonId;

//
// ─── COMPLETED-LESSON SETS ─────────────────────────────────────────────────────
//

/// Membership test for the lessons a student has completed.
pub trait CompletedLessons {
    fn contains_lesson(&self, lesson_id: &LessonId) -> bool;
}

impl<S: BuildHasher> CompletedLessons for HashSet<LessonId, S> {
    fn contains_lesson(&self, lesson_id: &LessonId) -> bool {
        self.contains(lesson_id)
    }
}

impl CompletedLessons for BTreeSet<LessonId> {
    fn contains_lesson(&self, lesson_id: &LessonId) -> bool {
        self.contains(lesson_id)
    }
}

//
// ─── COMPLETION TYPES ──────────────────────────────────────────────────────────
//

/// Completed-lesson counts for a chapter or a whole course.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    /// Number of lessons, including nested chapters.
    pub lesson_count: u32,
    /// Number of completed lessons, including nested chapters.
    pub completed_lesson_count: u32,
    pub completion_percentage: f64,
}

impl Completion {
    /// Builds a completion from raw counts.
    ///
    /// A node without any lessons reports `0.0` percent. This is a deliberate
    /// policy choice; it is the single place to change if empty chapters
    /// should ever count as complete.
    #[must_use]
    pub fn from_counts(lesson_count: u32, completed_lesson_count: u32) -> Self {
        let completion_percentage = if lesson_count == 0 {
            0.0
        } else {
            f64::from(completed_lesson_count) / f64::from(lesson_count) * 100.0
        };

        Self {
            lesson_count,
            completed_lesson_count,
            completion_percentage,
        }
    }

    /// True when there is at least one lesson and all of them are completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.lesson_count > 0 && self.completed_lesson_count == self.lesson_count
    }

    fn combine(self, other: Self) -> Self {
        Self::from_counts(
            self.lesson_count + other.lesson_count,
            self.completed_lesson_count + other.completed_lesson_count,
        )
    }
}

/// A content tree annotated with completion for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseCompletion {
    pub completion: Completion,
    pub content: Vec<CompletionNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CompletionNode {
    Chapter(ChapterWithCompletion),
    Lesson(LessonWithCompletion),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterWithCompletion {
    #[serde(rename = "chapterNr")]
    pub chapter_number: String,
    pub title: String,
    pub description: Option<String>,
    pub completion: Completion,
    pub content: Vec<CompletionNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonWithCompletion {
    #[serde(rename = "lessonNr")]
    pub lesson_number: u32,
    pub lesson_id: LessonId,
    pub is_completed: bool,
}

impl TreeNode for CompletionNode {
    fn children(&self) -> &[Self] {
        match self {
            CompletionNode::Chapter(chapter) => &chapter.content,
            CompletionNode::Lesson(_) => &[],
        }
    }
}

impl CompletionNode {
    #[must_use]
    pub fn completion(&self) -> Completion {
        match self {
            CompletionNode::Chapter(chapter) => chapter.completion,
            CompletionNode::Lesson(lesson) => {
                Completion::from_counts(1, u32::from(lesson.is_completed))
            }
        }
    }
}

impl CourseCompletion {
    /// Finds the annotated chapter with the given chapter number.
    #[must_use]
    pub fn chapter(&self, chapter_number: &str) -> Option<&ChapterWithCompletion> {
        PreOrder::new(&self.content).find_map(|node| match node {
            CompletionNode::Chapter(chapter) if chapter.chapter_number == chapter_number => {
                Some(chapter)
            }
            _ => None,
        })
    }
}

//
// ─── AGGREGATION ───────────────────────────────────────────────────────────────
//

/// Annotates a numbered content tree with the completion state of one student.
///
/// Lessons are completed when their id is in `completed`; ids in `completed`
/// that do not occur in the tree are ignored. Chapter and course counts are
/// sums over their descendants.
#[must_use]
pub fn compute_course_completion<C>(content: &[ContentNode], completed: &C) -> CourseCompletion
where
    C: CompletedLessons + ?Sized,
{
    let (content, completion) = fold_siblings(content, completed);
    CourseCompletion {
        completion,
        content,
    }
}

fn fold_siblings<C>(nodes: &[ContentNode], completed: &C) -> (Vec<CompletionNode>, Completion)
where
    C: CompletedLessons + ?Sized,
{
    let mut total = Completion::default();
    let mut annotated = Vec::with_capacity(nodes.len());

    for node in nodes {
        let node = match node {
            ContentNode::Chapter(chapter) => {
                let (content, completion) = fold_siblings(&chapter.children, completed);
                CompletionNode::Chapter(ChapterWithCompletion {
                    chapter_number: chapter.chapter_number.clone(),
                    title: chapter.title.clone(),
                    description: chapter.description.clone(),
                    completion,
                    content,
                })
            }
            ContentNode::Lesson(lesson) => CompletionNode::Lesson(LessonWithCompletion {
                lesson_number: lesson.lesson_number,
                lesson_id: lesson.lesson_id.clone(),
                is_completed: completed.contains_lesson(&lesson.lesson_id),
            }),
        };
        total = total.combine(node.completion());
        annotated.push(node);
    }

    (annotated, total)
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

    fn completed(ids: &[&str]) -> HashSet<LessonId> {
        ids.iter().copied().map(LessonId::from).collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 0.01,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn aggregates_course_and_chapters() {
        let result = compute_course_completion(&sample(), &completed(&["l1", "l3"]));

        assert_eq!(result.completion.lesson_count, 3);
        assert_eq!(result.completion.completed_lesson_count, 2);
        assert_close(result.completion.completion_percentage, 66.67);

        let a = result.chapter("1").unwrap().completion;
        assert_eq!((a.lesson_count, a.completed_lesson_count), (2, 1));
        assert_close(a.completion_percentage, 50.0);

        let b = result.chapter("2").unwrap().completion;
        assert_eq!((b.lesson_count, b.completed_lesson_count), (1, 1));
        assert_close(b.completion_percentage, 100.0);

        let b1 = result.chapter("2.1").unwrap().completion;
        assert_eq!((b1.lesson_count, b1.completed_lesson_count), (1, 1));
        assert_close(b1.completion_percentage, 100.0);
    }

    #[test]
    fn marks_individual_lessons() {
        let result = compute_course_completion(&sample(), &completed(&["l2"]));
        let CompletionNode::Chapter(a) = &result.content[0] else {
            panic!("expected chapter");
        };
        let flags: Vec<bool> = a
            .content
            .iter()
            .map(|node| match node {
                CompletionNode::Lesson(lesson) => lesson.is_completed,
                CompletionNode::Chapter(_) => panic!("expected lesson"),
            })
            .collect();
        assert_eq!(flags, vec![false, true]);
    }

    #[test]
    fn empty_chapter_reports_zero_percent() {
        // No lessons means 0%, not 100% and not NaN.
        let content = create_course_content(vec![create_chapter(
            "empty",
            vec![create_chapter("also empty", vec![], None)],
            None,
        )]);
        let result = compute_course_completion(&content, &completed(&["l1"]));

        let chapter = result.chapter("1").unwrap().completion;
        assert_eq!(chapter.lesson_count, 0);
        assert_eq!(chapter.completed_lesson_count, 0);
        assert_eq!(chapter.completion_percentage, 0.0);
        assert!(!chapter.is_complete());
        assert_eq!(result.completion.completion_percentage, 0.0);
    }

    #[test]
    fn empty_course_reports_zero_percent() {
        let result = compute_course_completion(&[], &completed(&[]));
        assert_eq!(result.completion, Completion::from_counts(0, 0));
        assert!(result.content.is_empty());
    }

    #[test]
    fn unknown_completed_ids_are_ignored() {
        let result = compute_course_completion(
            &sample(),
            &completed(&["l1", "not-in-course", "another-course-lesson"]),
        );

        assert_eq!(result.completion.lesson_count, 3);
        assert_eq!(result.completion.completed_lesson_count, 1);
        assert_close(result.completion.completion_percentage, 33.33);
    }

    #[test]
    fn fully_completed_course_is_one_hundred_percent() {
        let result = compute_course_completion(&sample(), &completed(&["l1", "l2", "l3"]));
        assert!(result.completion.is_complete());
        assert_close(result.completion.completion_percentage, 100.0);
        for chapter in ["1", "2", "2.1"] {
            assert!(result.chapter(chapter).unwrap().completion.is_complete());
        }
    }

    #[test]
    fn accepts_ordered_sets() {
        let ordered: BTreeSet<LessonId> = ["l3"].into_iter().map(LessonId::from).collect();
        let result = compute_course_completion(&sample(), &ordered);
        assert_eq!(result.completion.completed_lesson_count, 1);
    }

    #[test]
    fn serializes_with_wire_names() {
        let result = compute_course_completion(&sample(), &completed(&["l1"]));
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["completion"]["lessonCount"], 3);
        assert_eq!(value["completion"]["completedLessonCount"], 1);
        assert_eq!(value["content"][0]["type"], "chapter");
        assert_eq!(value["content"][0]["chapterNr"], "1");
        assert_eq!(value["content"][0]["content"][0]["lessonNr"], 1);
        assert_eq!(value["content"][0]["content"][0]["isCompleted"], true);
    }
}

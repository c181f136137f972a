use serde::Serialize;
use similar::{capture_diff_slices, Algorithm, DiffTag};

use crate::basic_models::RecipeDraft;

/// One piece of a diff pane.
///
/// Text is kept raw; whoever renders the segments is responsible for escaping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum DiffSegment {
    Unchanged(String),
    Removed(String),
    Added(String),
    Newline,
}

impl DiffSegment {
    pub fn text(&self) -> &str {
        match self {
            DiffSegment::Unchanged(text) | DiffSegment::Removed(text) | DiffSegment::Added(text) => {
                text
            }
            DiffSegment::Newline => "\n",
        }
    }
}

/// Line-level comparison of two texts as a pair of panes.
///
/// The `before` pane holds unchanged and removed lines, the `after` pane holds
/// unchanged and added lines. Lines within a pane are separated by
/// [`DiffSegment::Newline`] with no trailing separator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecipeDiff {
    pub before: Vec<DiffSegment>,
    pub after: Vec<DiffSegment>,
}

impl RecipeDiff {
    /// The before text, minus at most one trailing newline.
    pub fn before_text(&self) -> String {
        self.before.iter().map(DiffSegment::text).collect()
    }

    /// The after text, minus at most one trailing newline.
    pub fn after_text(&self) -> String {
        self.after.iter().map(DiffSegment::text).collect()
    }

    pub fn has_changes(&self) -> bool {
        self.before
            .iter()
            .chain(self.after.iter())
            .any(|segment| matches!(segment, DiffSegment::Removed(_) | DiffSegment::Added(_)))
    }
}

pub fn diff(before_text: &str, after_text: &str) -> RecipeDiff {
    let before_lines: Vec<&str> = before_text.lines().collect();
    let after_lines: Vec<&str> = after_text.lines().collect();

    let mut diff = RecipeDiff::default();
    for op in capture_diff_slices(Algorithm::Myers, &before_lines, &after_lines) {
        let (tag, before_range, after_range) = op.as_tag_tuple();
        if matches!(tag, DiffTag::Equal) {
            for line in &before_lines[before_range] {
                push_line(&mut diff.before, DiffSegment::Unchanged(line.to_string()));
                push_line(&mut diff.after, DiffSegment::Unchanged(line.to_string()));
            }
            continue;
        }
        if matches!(tag, DiffTag::Delete | DiffTag::Replace) {
            for line in &before_lines[before_range] {
                push_line(&mut diff.before, DiffSegment::Removed(line.to_string()));
            }
        }
        if matches!(tag, DiffTag::Insert | DiffTag::Replace) {
            for line in &after_lines[after_range] {
                push_line(&mut diff.after, DiffSegment::Added(line.to_string()));
            }
        }
    }

    for pane in [&mut diff.before, &mut diff.after] {
        if pane.last() == Some(&DiffSegment::Newline) {
            pane.pop();
        }
    }
    diff
}

/// Diff the markdown renderings of two recipes, baseline first.
pub fn diff_recipes(original: &RecipeDraft, current: &RecipeDraft) -> RecipeDiff {
    diff(&original.markdown(), &current.markdown())
}

fn push_line(pane: &mut Vec<DiffSegment>, segment: DiffSegment) {
    pane.push(segment);
    pane.push(DiffSegment::Newline);
}

#[cfg(test)]
mod tests {
    use super::*;
    use DiffSegment::*;

    #[test]
    fn test_identical_texts() {
        let diff = diff("a\nb\n", "a\nb\n");
        assert_eq!(diff.before, vec![Unchanged("a".into()), Newline, Unchanged("b".into())]);
        assert_eq!(diff.before, diff.after);
        assert!(!diff.has_changes());
    }

    #[test]
    fn test_replaced_line() {
        let diff = diff("a\nb\nc", "a\nB\nc");
        assert_eq!(
            diff.before,
            vec![
                Unchanged("a".into()),
                Newline,
                Removed("b".into()),
                Newline,
                Unchanged("c".into())
            ]
        );
        assert_eq!(
            diff.after,
            vec![
                Unchanged("a".into()),
                Newline,
                Added("B".into()),
                Newline,
                Unchanged("c".into())
            ]
        );
        assert!(diff.has_changes());
    }

    #[test]
    fn test_panes_only_carry_their_side() {
        let diff = diff("keep\nold\n", "keep\nnew\nextra\n");
        assert!(!diff.before.iter().any(|s| matches!(s, Added(_))));
        assert!(!diff.after.iter().any(|s| matches!(s, Removed(_))));
    }

    #[test]
    fn test_round_trip_modulo_trailing_newline() {
        let before = "# Cake\n\n## Ingredients\n- flour\n- <b>sugar</b> & salt\n";
        let after = "# Cake\n\n**Makes:** 4 servings\n\n## Ingredients\n- flour\n";
        let diff = diff(before, after);
        assert_eq!(diff.before_text(), before.trim_end_matches('\n'));
        assert_eq!(diff.after_text(), after.trim_end_matches('\n'));
    }

    #[test]
    fn test_empty_texts() {
        let diff = diff("", "");
        assert!(diff.before.is_empty());
        assert!(diff.after.is_empty());

        let diff = super::diff("", "only\n");
        assert!(diff.before.is_empty());
        assert_eq!(diff.after, vec![Added("only".into())]);
    }

    #[test]
    fn test_recipe_diff_uses_markdown() {
        let original = RecipeDraft {
            name: "Soup".into(),
            ingredients: vec!["water".into()],
            ..Default::default()
        };
        let mut current = original.clone();
        current.ingredients.push("salt".into());
        let diff = diff_recipes(&original, &current);
        assert_eq!(diff.after.last(), Some(&Added("- salt".into())));
        assert_eq!(diff.before_text(), original.markdown().trim_end());
    }
}

// Selection text codec.
// Compact, reversible encoding of a selection used in URL query strings
// and persisted dashboards: `octo/app[1,2],octo/lib[]`. The grammar must
// stay stable for compatibility with previously shared links.

use tracing::debug;

use crate::error::{AmpereError, Result};

use super::model::Selection;

/// Encode a selection as text.
///
/// Each repo emits `name[id1,id2,...]` with ids in ascending order;
/// segments are joined by single commas. An empty selection encodes to
/// the empty string, and a repo with no chosen workflows still emits
/// `name[]`.
pub fn encode(selection: &Selection) -> String {
    selection
        .iter()
        .map(|repo| {
            let ids = repo
                .workflow_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",");
            format!("{}[{}]", repo.repo, ids)
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Decode selection text.
///
/// The text is scanned for maximal segments of the form `name[body]`:
/// `name` is everything since the previous segment up to the next `[`
/// (minus the single comma separating it from the previous segment), and
/// `body` is everything up to the next `]`. Body pieces that fail to
/// parse as base-10 integers are dropped rather than failing the whole
/// decode, so one corrupted id cannot invalidate an entire shared link.
///
/// Returns `MalformedSelection` when non-empty input contains no valid
/// segment at all. The empty string decodes to an empty selection.
pub fn decode(text: &str) -> Result<Selection> {
    if text.is_empty() {
        return Ok(Selection::new());
    }

    let mut selection = Selection::new();
    let mut any_segment = false;
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        let Some(close) = rest[open..].find(']').map(|i| open + i) else {
            break;
        };

        // A single leading comma is the separator left over from the
        // previous segment's boundary.
        let name = rest[..open].strip_prefix(',').unwrap_or(&rest[..open]);

        if name.is_empty() {
            rest = &rest[close + 1..];
            continue;
        }

        any_segment = true;
        selection.add_repo(name);

        for piece in rest[open + 1..close].split(',') {
            if piece.is_empty() {
                continue;
            }
            match piece.parse::<u64>() {
                Ok(id) => selection.add_workflow(name, id),
                Err(_) => debug!(repo = name, token = piece, "dropped unparseable workflow id"),
            }
        }

        rest = &rest[close + 1..];
    }

    if !any_segment {
        return Err(AmpereError::MalformedSelection(text.to_string()));
    }

    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::model::RepoSelection;

    fn ids(selection: &Selection, repo: &str) -> Vec<u64> {
        selection
            .workflow_ids(repo)
            .unwrap()
            .iter()
            .copied()
            .collect()
    }

    #[test]
    fn test_encode_example() {
        let selection: Selection = [
            RepoSelection::with_ids("org/app", [1, 2]),
            RepoSelection::new("org/lib"),
        ]
        .into_iter()
        .collect();

        assert_eq!(encode(&selection), "org/app[1,2],org/lib[]");
    }

    #[test]
    fn test_encode_empty_selection() {
        assert_eq!(encode(&Selection::new()), "");
    }

    #[test]
    fn test_encode_orders_ids_ascending() {
        let selection: Selection =
            [RepoSelection::with_ids("org/app", [30, 2, 100])].into_iter().collect();
        assert_eq!(encode(&selection), "org/app[2,30,100]");
    }

    #[test]
    fn test_decode_example() {
        let decoded = decode("org/app[1,2],org/lib[]").unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(ids(&decoded, "org/app"), vec![1, 2]);
        assert_eq!(ids(&decoded, "org/lib"), Vec::<u64>::new());
    }

    #[test]
    fn test_decode_empty_string() {
        let decoded = decode("").unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_decode_rejects_text_with_no_segment() {
        assert!(matches!(
            decode("not-a-valid-format"),
            Err(AmpereError::MalformedSelection(_))
        ));
        assert!(matches!(
            decode("unclosed[1,2"),
            Err(AmpereError::MalformedSelection(_))
        ));
        assert!(matches!(decode("[1,2]"), Err(AmpereError::MalformedSelection(_))));
    }

    #[test]
    fn test_decode_drops_unparseable_ids() {
        let decoded = decode("repoA[1,x,3]").unwrap();
        assert_eq!(ids(&decoded, "repoA"), vec![1, 3]);
    }

    #[test]
    fn test_decode_ignores_trailing_garbage() {
        let decoded = decode("org/app[1],leftover").unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(ids(&decoded, "org/app"), vec![1]);
    }

    #[test]
    fn test_decode_unions_duplicate_repo_segments() {
        let decoded = decode("org/app[1],org/app[2]").unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(ids(&decoded, "org/app"), vec![1, 2]);
    }

    #[test]
    fn test_round_trip() {
        let selection: Selection = [
            RepoSelection::with_ids("octo/api", [14, 3, 99]),
            RepoSelection::new("octo/site"),
            RepoSelection::with_ids("other/tool", [7]),
        ]
        .into_iter()
        .collect();

        assert_eq!(decode(&encode(&selection)).unwrap(), selection);
    }

    #[test]
    fn test_round_trip_from_decoded_text() {
        let text = "org/app[1,2],org/lib[]";
        let decoded = decode(text).unwrap();
        assert_eq!(encode(&decoded), text);
    }
}

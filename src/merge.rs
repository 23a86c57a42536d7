use std::collections::HashMap;

use crate::entry::{Entry, Layer};

/// Merge entry layers, lowest priority first.
///
/// For each identity the entry from the highest-priority layer that
/// defines it wins entirely; nothing is blended field by field. Entries
/// present only in lower layers pass through unchanged. The output
/// preserves first-seen identity order across the layers, and every
/// entry is stamped with the name of the layer that supplied its
/// effective version.
pub fn merge(layers: Vec<Layer>) -> Vec<Entry> {
    let mut order: Vec<String> = Vec::new();
    let mut winners: HashMap<String, Entry> = HashMap::new();

    for layer in layers {
        for mut entry in layer.entries {
            entry.origin_layer = layer.name.clone();
            let identity = entry.identity.clone();
            match winners.insert(identity.clone(), entry) {
                None => order.push(identity),
                Some(previous) => {
                    tracing::debug!(
                        identity = %identity,
                        from = %previous.origin_layer,
                        to = %layer.name,
                        "layer override"
                    );
                }
            }
        }
    }

    order
        .into_iter()
        .filter_map(|identity| winners.remove(&identity))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;

    #[test]
    fn later_layer_replaces_whole_entry() {
        let merged = merge(vec![
            Layer::new("global", vec![Entry::knowledge("x", "foo value")]),
            Layer::new("host", vec![Entry::knowledge("x", "bar value")]),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].identity, "x");
        assert_eq!(merged[0].secondary_text, "bar value");
        assert_eq!(merged[0].origin_layer, "host");
    }

    #[test]
    fn lower_layer_entries_pass_through() {
        let merged = merge(vec![
            Layer::new(
                "global",
                vec![
                    Entry::knowledge("only global", "g"),
                    Entry::knowledge("shared", "global version"),
                ],
            ),
            Layer::new("host", vec![Entry::knowledge("shared", "host version")]),
        ]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].identity, "only global");
        assert_eq!(merged[0].origin_layer, "global");
        assert_eq!(merged[1].secondary_text, "host version");
    }

    #[test]
    fn first_seen_order_is_preserved() {
        let merged = merge(vec![
            Layer::new(
                "global",
                vec![Entry::knowledge("b", "1"), Entry::knowledge("a", "2")],
            ),
            Layer::new("host", vec![Entry::knowledge("c", "3")]),
        ]);

        let identities: Vec<_> = merged.iter().map(|e| e.identity.as_str()).collect();
        assert_eq!(identities, vec!["b", "a", "c"]);
    }

    #[test]
    fn tools_and_knowledge_share_the_identity_space() {
        let merged = merge(vec![
            Layer::new("global", vec![Entry::knowledge("backup", "old notes")]),
            Layer::new(
                "host",
                vec![Entry::tool("backup", "archive", "Nightly", None)],
            ),
        ]);

        assert_eq!(merged.len(), 1);
        assert!(matches!(merged[0].kind, EntryKind::Tool { .. }));
    }

    #[test]
    fn empty_layers_merge_to_nothing() {
        assert!(merge(vec![]).is_empty());
        assert!(merge(vec![Layer::new("global", vec![])]).is_empty());
    }
}

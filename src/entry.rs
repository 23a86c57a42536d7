/// What a matched entry resolves to.
///
/// Scoring never looks at this; only the dispatcher does. Knowledge
/// entries keep their value in [`Entry::secondary_text`] (it is both the
/// displayed payload and secondary matching text), so the variant is
/// empty. Tools carry the command line their manifest declared, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Knowledge,
    Tool { exec: Option<String> },
}

impl EntryKind {
    /// Short label for result listings.
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Knowledge => "knowledge",
            EntryKind::Tool { .. } => "tool",
        }
    }
}

/// The unit of retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Unique key within a merged entry set: the literal tag string for
    /// knowledge, the declared name for tools.
    pub identity: String,
    /// Tag/name text, matched at full weight.
    pub primary_text: String,
    /// Value or description text, matched at half weight. May be empty.
    pub secondary_text: String,
    /// Which layer supplied the effective version. Stamped during
    /// merging; diagnostics only, never scored.
    pub origin_layer: String,
    pub kind: EntryKind,
}

impl Entry {
    /// A knowledge entry: the tag string is the identity, the value is
    /// the secondary text.
    pub fn knowledge(tags: &str, value: &str) -> Self {
        Self {
            identity: tags.to_string(),
            primary_text: tags.to_string(),
            secondary_text: value.to_string(),
            origin_layer: String::new(),
            kind: EntryKind::Knowledge,
        }
    }

    /// A tool entry. The name joins the declared tags in the primary
    /// text so a tool is findable by either.
    pub fn tool(
        name: &str,
        tags: &str,
        description: &str,
        exec: Option<String>,
    ) -> Self {
        let primary_text = if tags.is_empty() {
            name.to_string()
        } else {
            format!("{name} {tags}")
        };
        Self {
            identity: name.to_string(),
            primary_text,
            secondary_text: description.to_string(),
            origin_layer: String::new(),
            kind: EntryKind::Tool { exec },
        }
    }
}

/// One source of entries with a priority position.
///
/// Layers are merged lowest priority first; see [`crate::merge::merge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub name: String,
    pub entries: Vec<Entry>,
}

impl Layer {
    pub fn new(name: &str, entries: Vec<Entry>) -> Self {
        Self {
            name: name.to_string(),
            entries,
        }
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single finding reported by a vetter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Content-addressed identifier. Empty until assigned with [`Note::with_id`].
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// The category of the finding, usually the reporting vetter's type.
    #[serde(rename = "type")]
    pub type_: String,

    pub summary: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,

    pub level: NoteLevel,

    /// Extra attributes used when rendering `msg`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attr: BTreeMap<String, String>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoteLevel {
    #[default]
    Info,
    Warning,
    Error,
}

/// The fields of a note that contribute to its identifier.
#[derive(Serialize)]
struct Content<'n> {
    #[serde(rename = "type")]
    type_: &'n str,
    summary: &'n str,
    msg: Option<&'n str>,
    level: NoteLevel,
    attr: &'n BTreeMap<String, String>,
}

// === impl Note ===

impl Note {
    pub fn new(type_: impl Into<String>, summary: impl Into<String>, level: NoteLevel) -> Self {
        Self {
            type_: type_.into(),
            summary: summary.into(),
            level,
            ..Default::default()
        }
    }

    /// Returns the hex-encoded MD5 digest of the note's content.
    ///
    /// The `id` field itself is not hashed, so computing the identifier of a note that already has
    /// one yields the same value. Identical findings reported by separate runs share an identifier,
    /// which lets consumers deduplicate them.
    pub fn compute_id(&self) -> String {
        let content = Content {
            type_: &self.type_,
            summary: &self.summary,
            msg: self.msg.as_deref(),
            level: self.level,
            attr: &self.attr,
        };
        let bytes = serde_json::to_vec(&content).expect("note content must serialize");
        format!("{:x}", md5::compute(bytes))
    }

    pub fn with_id(mut self) -> Self {
        self.id = self.compute_id();
        self
    }
}

// === impl NoteLevel ===

impl std::fmt::Display for NoteLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => "INFO".fmt(f),
            Self::Warning => "WARNING".fmt(f),
            Self::Error => "ERROR".fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::{btreemap, convert_args};

    fn mk_note(summary: &str) -> Note {
        Note::new("MeshVersion", summary, NoteLevel::Warning)
    }

    #[test]
    fn identical_notes_share_id() {
        let a = mk_note("proxy version mismatch");
        let b = mk_note("proxy version mismatch");
        assert_eq!(a.compute_id(), b.compute_id());
        assert_eq!(a.compute_id().len(), 32);
        assert!(a
            .compute_id()
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn differing_notes_have_distinct_ids() {
        let base = mk_note("proxy version mismatch");
        for (other, msg) in [
            (mk_note("proxy image mismatch"), "summary"),
            (
                Note::new("MeshVersion", "proxy version mismatch", NoteLevel::Error),
                "level",
            ),
            (
                Note::new("PodConfig", "proxy version mismatch", NoteLevel::Warning),
                "type",
            ),
            (
                Note {
                    msg: Some("pod ${pod} runs ${version}".into()),
                    ..mk_note("proxy version mismatch")
                },
                "msg",
            ),
            (
                Note {
                    attr: convert_args!(btreemap!("pod" => "web-0")),
                    ..mk_note("proxy version mismatch")
                },
                "attr",
            ),
        ] {
            assert_ne!(base.compute_id(), other.compute_id(), "{}", msg);
        }
    }

    #[test]
    fn id_is_not_hashed() {
        let note = mk_note("proxy version mismatch").with_id();
        assert!(!note.id.is_empty());
        assert_eq!(note.compute_id(), note.id);
        assert_eq!(note.clone().with_id(), note);
    }

    #[test]
    fn serializes_wire_names() {
        let note = Note {
            attr: convert_args!(btreemap!("namespace" => "default")),
            ..mk_note("summary")
        };
        assert_eq!(
            serde_json::to_value(&note).unwrap(),
            serde_json::json!({
                "type": "MeshVersion",
                "summary": "summary",
                "level": "WARNING",
                "attr": { "namespace": "default" },
            })
        );
    }
}

use mesh_vet_core::{Note, NoteLevel};

/// The lookup error reported when the injector's ConfigMap does not exist.
const INITIALIZER_DISABLED: &str = r#"configmaps "istio-inject" not found"#;

const INITIALIZER_DISABLED_SUMMARY: &str = "Istio initializer is not configured. \
    Enable initializer and automatic sidecar injection to use ";

/// Explains a missing injector ConfigMap as an informational note.
///
/// Vetters that depend on mesh membership fail when automatic injection is not set up. When
/// `error` is that failure, returns a note of type `vetter_type` telling the user how to enable
/// the `vetter_id` vetter. Any other error yields `None`.
pub fn initializer_disabled_note(error: &str, vetter_id: &str, vetter_type: &str) -> Option<Note> {
    if !error.contains(INITIALIZER_DISABLED) {
        return None;
    }

    Some(Note::new(
        vetter_type,
        format!("{INITIALIZER_DISABLED_SUMMARY}\"{vetter_id}\" vetter."),
        NoteLevel::Info,
    ))
}

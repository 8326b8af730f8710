use serde::{Deserialize, Serialize};

/// What the tree editor is currently doing. Clients send this alongside
/// tree mutations instead of encoding it in loose query parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EditState {
    #[default]
    Idle,
    CreatingLineType { drawing_type_id: i32 },
    EditingLineType { line_type_id: i32 },
    CreatingComponent { line_type_id: i32 },
    EditingComponent { line_type_component_id: i32 },
}

impl EditState {
    /// Drag and drop is only available while no inline form is open
    pub fn allows_drag(&self) -> bool {
        matches!(self, EditState::Idle)
    }
}

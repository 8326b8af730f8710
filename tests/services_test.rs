//! Service layer tests
//!
//! Ordering invariants for line types and line type components across create,
//! delete, duplicate and move, plus the catalog and selection services.

use anyhow::Result;
use sea_orm::{DatabaseConnection, EntityTrait};
use taxonomy::database::connect_in_memory;
use taxonomy::database::entities::{components, line_type_components, line_types};
use taxonomy::errors::CoreErrorKind;
use taxonomy::ordering::{is_contiguous, DepthClass, Disposition, EditState};
use taxonomy::services::component_service::{NewComponent, NewPart};
use taxonomy::services::component_version_service::{LabelImport, NewComponentVersion};
use taxonomy::services::drawing_type_service::NewDrawingType;
use taxonomy::services::line_type_component_service::{
    LineTypeComponentUpdate, NewLineTypeComponent,
};
use taxonomy::services::line_type_service::{LineTypeUpdate, NewLineType};
use taxonomy::services::reorder_service::{MoveRequest, NodeRef, RefreshedGroup};
use taxonomy::services::siblings;
use taxonomy::services::{
    ComponentService, ComponentVersionService, DrawingTypeService, LineTypeComponentService,
    LineTypeService, PartService, ReorderService, TreeLocks,
};

struct Fixture {
    db: DatabaseConnection,
    drawing_type_id: i32,
    version_id: i32,
}

impl Fixture {
    async fn new() -> Result<Self> {
        let db = connect_in_memory().await?;
        let drawing_type = DrawingTypeService::new(db.clone())
            .create(NewDrawingType {
                name: "Single line diagram".to_string(),
                description: None,
                visible: None,
            })
            .await?;
        let version = ComponentVersionService::new(db.clone())
            .create(NewComponentVersion {
                name: "v1".to_string(),
                emoji: None,
                description: None,
            })
            .await?;

        Ok(Self {
            db,
            drawing_type_id: drawing_type.id,
            version_id: version.id,
        })
    }

    fn line_types(&self) -> LineTypeService {
        LineTypeService::new(self.db.clone())
    }

    fn entries(&self) -> LineTypeComponentService {
        LineTypeComponentService::new(self.db.clone())
    }

    fn reorder(&self) -> ReorderService {
        ReorderService::new(self.db.clone(), std::sync::Arc::new(TreeLocks::new()))
    }

    async fn line_type(&self, name: &str) -> Result<line_types::Model> {
        Ok(self
            .line_types()
            .create(
                self.drawing_type_id,
                NewLineType {
                    name: name.to_string(),
                    description: None,
                },
            )
            .await?)
    }

    async fn component(&self, name: &str) -> Result<components::Model> {
        Ok(ComponentService::new(self.db.clone())
            .create(
                self.version_id,
                NewComponent {
                    name: name.to_string(),
                    description: None,
                    color: "#F20D7A".to_string(),
                    part_id: None,
                },
            )
            .await?)
    }

    /// Line type `name` holding one entry per component name
    async fn line_type_with(
        &self,
        name: &str,
        component_names: &[&str],
    ) -> Result<(line_types::Model, Vec<line_type_components::Model>)> {
        let line_type = self.line_type(name).await?;
        let mut entries = Vec::new();
        for component_name in component_names {
            let component = self.component(component_name).await?;
            entries.push(
                self.entries()
                    .create(
                        line_type.id,
                        NewLineTypeComponent {
                            component_id: component.id,
                            count: None,
                            component_type: None,
                        },
                    )
                    .await?,
            );
        }
        Ok((line_type, entries))
    }

    async fn line_type_names(&self) -> Result<Vec<String>> {
        Ok(
            siblings::children::<line_types::Entity, _>(&self.db, self.drawing_type_id)
                .await?
                .into_iter()
                .map(|line_type| line_type.name)
                .collect(),
        )
    }

    async fn line_type_indices(&self) -> Result<Vec<i32>> {
        Ok(siblings::indices::<line_types::Entity, _>(&self.db, self.drawing_type_id).await?)
    }

    async fn entry_ids(&self, line_type_id: i32) -> Result<Vec<i32>> {
        Ok(
            siblings::children::<line_type_components::Entity, _>(&self.db, line_type_id)
                .await?
                .into_iter()
                .map(|entry| entry.id)
                .collect(),
        )
    }

    async fn entry_indices(&self, line_type_id: i32) -> Result<Vec<i32>> {
        Ok(siblings::indices::<line_type_components::Entity, _>(&self.db, line_type_id).await?)
    }
}

fn node(kind: DepthClass, id: i32, pos: &str) -> NodeRef {
    NodeRef {
        kind,
        id,
        pos: pos.to_string(),
    }
}

fn move_request(drag: NodeRef, drop: NodeRef, disposition: Disposition) -> MoveRequest {
    MoveRequest {
        drag,
        drop,
        disposition,
        edit_state: EditState::Idle,
    }
}

#[tokio::test]
async fn test_create_appends_at_next_index() -> Result<()> {
    let fx = Fixture::new().await?;

    let first = fx.line_type("115kV").await?;
    let second = fx.line_type("230kV").await?;
    let third = fx.line_type("500kV").await?;

    assert_eq!((first.index, second.index, third.index), (0, 1, 2));
    assert_eq!(fx.line_type_indices().await?, vec![0, 1, 2]);
    Ok(())
}

#[tokio::test]
async fn test_delete_renumbers_later_siblings() -> Result<()> {
    let fx = Fixture::new().await?;
    for name in ["A", "B", "C", "D"] {
        fx.line_type(name).await?;
    }
    let children = siblings::children::<line_types::Entity, _>(&fx.db, fx.drawing_type_id).await?;
    let b = children[1].clone();

    fx.line_types().delete(b.id).await?;

    assert_eq!(fx.line_type_indices().await?, vec![0, 1, 2]);
    assert_eq!(fx.line_type_names().await?, vec!["A", "C", "D"]);
    Ok(())
}

#[tokio::test]
async fn test_delete_line_type_component_renumbers() -> Result<()> {
    let fx = Fixture::new().await?;
    let (line_type, entries) = fx
        .line_type_with("115kV", &["breaker", "switch", "transformer"])
        .await?;

    fx.entries().delete(entries[0].id).await?;

    assert_eq!(fx.entry_indices(line_type.id).await?, vec![0, 1]);
    assert_eq!(
        fx.entry_ids(line_type.id).await?,
        vec![entries[1].id, entries[2].id]
    );
    Ok(())
}

#[tokio::test]
async fn test_forward_same_parent_move() -> Result<()> {
    let fx = Fixture::new().await?;
    let mut items = Vec::new();
    for name in ["item0", "item1", "item2", "item3", "item4"] {
        items.push(fx.line_type(name).await?);
    }

    let outcome = fx
        .reorder()
        .move_node(
            fx.drawing_type_id,
            move_request(
                node(DepthClass::LineType, items[1].id, "0-1"),
                node(DepthClass::LineType, items[3].id, "0-3"),
                Disposition::After,
            ),
        )
        .await?;

    assert!(outcome.changed);
    assert_eq!(outcome.affected_parents, vec![fx.drawing_type_id]);
    assert_eq!(
        fx.line_type_names().await?,
        vec!["item0", "item2", "item3", "item1", "item4"]
    );
    assert_eq!(fx.line_type_indices().await?, vec![0, 1, 2, 3, 4]);
    assert_eq!(fx.line_types().get(items[1].id).await?.index, 3);

    match &outcome.groups[..] {
        [RefreshedGroup::LineTypes { children, .. }] => {
            assert_eq!(children[3].id, items[1].id);
        }
        other => panic!("unexpected refreshed groups: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_backward_same_parent_move() -> Result<()> {
    let fx = Fixture::new().await?;
    let mut items = Vec::new();
    for name in ["item0", "item1", "item2", "item3", "item4"] {
        items.push(fx.line_type(name).await?);
    }

    fx.reorder()
        .move_node(
            fx.drawing_type_id,
            move_request(
                node(DepthClass::LineType, items[4].id, "0-4"),
                node(DepthClass::LineType, items[1].id, "0-1"),
                Disposition::Before,
            ),
        )
        .await?;

    assert_eq!(
        fx.line_type_names().await?,
        vec!["item0", "item4", "item1", "item2", "item3"]
    );
    assert_eq!(fx.line_type_indices().await?, vec![0, 1, 2, 3, 4]);
    Ok(())
}

#[tokio::test]
async fn test_cross_parent_move_to_end() -> Result<()> {
    let fx = Fixture::new().await?;
    let (a, a_entries) = fx.line_type_with("A", &["a0", "a1", "a2"]).await?;
    let (b, b_entries) = fx.line_type_with("B", &["b0", "b1"]).await?;

    let outcome = fx
        .reorder()
        .move_node(
            fx.drawing_type_id,
            move_request(
                node(DepthClass::Component, a_entries[1].id, "0-0-1"),
                node(DepthClass::Component, b_entries[1].id, "0-1-1"),
                Disposition::After,
            ),
        )
        .await?;

    assert_eq!(outcome.affected_parents, vec![a.id, b.id]);
    assert_eq!(outcome.groups.len(), 2);

    assert_eq!(fx.entry_indices(a.id).await?, vec![0, 1]);
    assert_eq!(
        fx.entry_ids(a.id).await?,
        vec![a_entries[0].id, a_entries[2].id]
    );
    assert_eq!(fx.entry_indices(b.id).await?, vec![0, 1, 2]);
    assert_eq!(
        fx.entry_ids(b.id).await?,
        vec![b_entries[0].id, b_entries[1].id, a_entries[1].id]
    );

    let moved = fx.entries().get(a_entries[1].id).await?;
    assert_eq!((moved.line_type_id, moved.index), (b.id, 2));
    Ok(())
}

#[tokio::test]
async fn test_cross_parent_move_between_children() -> Result<()> {
    let fx = Fixture::new().await?;
    let (a, a_entries) = fx.line_type_with("A", &["a0", "a1"]).await?;
    let (b, b_entries) = fx.line_type_with("B", &["b0", "b1", "b2"]).await?;

    fx.reorder()
        .move_node(
            fx.drawing_type_id,
            move_request(
                node(DepthClass::Component, a_entries[0].id, "0-0-0"),
                node(DepthClass::Component, b_entries[0].id, "0-1-0"),
                Disposition::After,
            ),
        )
        .await?;

    assert_eq!(fx.entry_ids(a.id).await?, vec![a_entries[1].id]);
    assert_eq!(fx.entry_indices(a.id).await?, vec![0]);
    assert_eq!(
        fx.entry_ids(b.id).await?,
        vec![b_entries[0].id, a_entries[0].id, b_entries[1].id, b_entries[2].id]
    );
    assert_eq!(fx.entry_indices(b.id).await?, vec![0, 1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn test_drop_onto_line_type_lands_first() -> Result<()> {
    let fx = Fixture::new().await?;
    let (a, a_entries) = fx.line_type_with("A", &["a0", "a1"]).await?;
    let (b, b_entries) = fx.line_type_with("B", &["b0"]).await?;
    let (empty, _) = fx.line_type_with("C", &[]).await?;

    fx.reorder()
        .move_node(
            fx.drawing_type_id,
            move_request(
                node(DepthClass::Component, a_entries[1].id, "0-0-1"),
                node(DepthClass::LineType, b.id, "0-1"),
                Disposition::Onto,
            ),
        )
        .await?;

    assert_eq!(
        fx.entry_ids(b.id).await?,
        vec![a_entries[1].id, b_entries[0].id]
    );
    assert_eq!(fx.entry_indices(b.id).await?, vec![0, 1]);
    assert_eq!(fx.entry_ids(a.id).await?, vec![a_entries[0].id]);

    fx.reorder()
        .move_node(
            fx.drawing_type_id,
            move_request(
                node(DepthClass::Component, a_entries[0].id, "0-0-0"),
                node(DepthClass::LineType, empty.id, "0-2"),
                Disposition::Onto,
            ),
        )
        .await?;

    assert!(fx.entry_ids(a.id).await?.is_empty());
    assert_eq!(fx.entry_indices(empty.id).await?, vec![0]);
    Ok(())
}

#[tokio::test]
async fn test_noop_move_writes_nothing() -> Result<()> {
    let fx = Fixture::new().await?;
    for name in ["A", "B", "C"] {
        fx.line_type(name).await?;
    }
    let before = siblings::children::<line_types::Entity, _>(&fx.db, fx.drawing_type_id).await?;

    // dropped onto itself
    let outcome = fx
        .reorder()
        .move_node(
            fx.drawing_type_id,
            move_request(
                node(DepthClass::LineType, before[1].id, "0-1"),
                node(DepthClass::LineType, before[1].id, "0-1"),
                Disposition::After,
            ),
        )
        .await?;
    assert!(!outcome.changed);
    assert!(outcome.affected_parents.is_empty());

    // dropped right after its predecessor, which is where it already is
    let outcome = fx
        .reorder()
        .move_node(
            fx.drawing_type_id,
            move_request(
                node(DepthClass::LineType, before[2].id, "0-2"),
                node(DepthClass::LineType, before[1].id, "0-1"),
                Disposition::After,
            ),
        )
        .await?;
    assert!(!outcome.changed);

    let after = siblings::children::<line_types::Entity, _>(&fx.db, fx.drawing_type_id).await?;
    assert_eq!(before, after);
    Ok(())
}

#[tokio::test]
async fn test_stale_position_is_rejected_before_writing() -> Result<()> {
    let fx = Fixture::new().await?;
    let mut items = Vec::new();
    for name in ["A", "B", "C"] {
        items.push(fx.line_type(name).await?);
    }
    let before = siblings::children::<line_types::Entity, _>(&fx.db, fx.drawing_type_id).await?;

    let err = fx
        .reorder()
        .move_node(
            fx.drawing_type_id,
            move_request(
                node(DepthClass::LineType, items[0].id, "0-2"),
                node(DepthClass::LineType, items[1].id, "0-1"),
                Disposition::After,
            ),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), CoreErrorKind::InvalidMove);
    let after = siblings::children::<line_types::Entity, _>(&fx.db, fx.drawing_type_id).await?;
    assert_eq!(before, after);
    Ok(())
}

#[tokio::test]
async fn test_invalid_drops_are_rejected() -> Result<()> {
    let fx = Fixture::new().await?;
    let (a, a_entries) = fx.line_type_with("A", &["a0"]).await?;
    let b = fx.line_type("B").await?;

    // line type onto a component slot
    let err = fx
        .reorder()
        .move_node(
            fx.drawing_type_id,
            move_request(
                node(DepthClass::LineType, b.id, "0-1"),
                node(DepthClass::Component, a_entries[0].id, "0-0-0"),
                Disposition::Before,
            ),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::InvalidMove);

    // line type onto another line type
    let err = fx
        .reorder()
        .move_node(
            fx.drawing_type_id,
            move_request(
                node(DepthClass::LineType, b.id, "0-1"),
                node(DepthClass::LineType, a.id, "0-0"),
                Disposition::Onto,
            ),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::InvalidMove);

    // malformed position token
    let err = fx
        .reorder()
        .move_node(
            fx.drawing_type_id,
            move_request(
                node(DepthClass::LineType, b.id, "0-x"),
                node(DepthClass::LineType, a.id, "0-0"),
                Disposition::Before,
            ),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::InvalidMove);

    // token depth disagrees with the declared kind
    let err = fx
        .reorder()
        .move_node(
            fx.drawing_type_id,
            move_request(
                node(DepthClass::Component, a_entries[0].id, "0-0"),
                node(DepthClass::LineType, b.id, "0-1"),
                Disposition::Onto,
            ),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::InvalidMove);

    // pending edit
    let mut request = move_request(
        node(DepthClass::LineType, b.id, "0-1"),
        node(DepthClass::LineType, a.id, "0-0"),
        Disposition::Before,
    );
    request.edit_state = EditState::EditingLineType { line_type_id: a.id };
    let err = fx
        .reorder()
        .move_node(fx.drawing_type_id, request)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::InvalidMove);

    assert_eq!(fx.line_type_names().await?, vec!["A", "B"]);
    Ok(())
}

#[tokio::test]
async fn test_move_into_line_type_already_listing_component_is_rejected() -> Result<()> {
    let fx = Fixture::new().await?;
    let (a, a_entries) = fx.line_type_with("A", &["breaker"]).await?;
    let (b, b_entries) = fx.line_type_with("B", &["bus"]).await?;
    let listed = fx
        .entries()
        .create(
            b.id,
            NewLineTypeComponent {
                component_id: a_entries[0].component_id,
                count: None,
                component_type: None,
            },
        )
        .await?;

    for (drop, disposition) in [
        (node(DepthClass::Component, b_entries[0].id, "0-1-0"), Disposition::After),
        (node(DepthClass::LineType, b.id, "0-1"), Disposition::Onto),
    ] {
        let err = fx
            .reorder()
            .move_node(
                fx.drawing_type_id,
                move_request(
                    node(DepthClass::Component, a_entries[0].id, "0-0-0"),
                    drop,
                    disposition,
                ),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::Conflict);
    }

    assert_eq!(fx.entry_ids(a.id).await?, vec![a_entries[0].id]);
    assert_eq!(
        fx.entry_ids(b.id).await?,
        vec![b_entries[0].id, listed.id]
    );

    // a duplicate may still be reordered inside its own line type
    let copy = fx.entries().duplicate(listed.id).await?;
    let outcome = fx
        .reorder()
        .move_node(
            fx.drawing_type_id,
            move_request(
                node(DepthClass::Component, copy.id, "0-1-2"),
                node(DepthClass::Component, b_entries[0].id, "0-1-0"),
                Disposition::Before,
            ),
        )
        .await?;
    assert!(outcome.changed);
    assert_eq!(
        fx.entry_ids(b.id).await?,
        vec![copy.id, b_entries[0].id, listed.id]
    );
    Ok(())
}

#[tokio::test]
async fn test_move_on_unknown_drawing_type_takes_no_lock() -> Result<()> {
    let fx = Fixture::new().await?;
    let a = fx.line_type("A").await?;
    let locks = std::sync::Arc::new(TreeLocks::new());
    let reorder = ReorderService::new(fx.db.clone(), locks.clone());

    let err = reorder
        .move_node(
            999,
            move_request(
                node(DepthClass::LineType, a.id, "0-0"),
                node(DepthClass::LineType, a.id, "0-0"),
                Disposition::After,
            ),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), CoreErrorKind::NotFound);
    assert!(!locks.is_tracked(999));

    reorder
        .move_node(
            fx.drawing_type_id,
            move_request(
                node(DepthClass::LineType, a.id, "0-0"),
                node(DepthClass::LineType, a.id, "0-0"),
                Disposition::After,
            ),
        )
        .await?;
    assert!(locks.is_tracked(fx.drawing_type_id));
    locks.forget(fx.drawing_type_id);
    assert!(!locks.is_tracked(fx.drawing_type_id));
    Ok(())
}

#[tokio::test]
async fn test_move_across_drawing_types_is_rejected() -> Result<()> {
    let fx = Fixture::new().await?;
    let a = fx.line_type("A").await?;
    let other = DrawingTypeService::new(fx.db.clone())
        .create(NewDrawingType {
            name: "Three line diagram".to_string(),
            description: None,
            visible: Some(false),
        })
        .await?;
    let foreign = fx
        .line_types()
        .create(
            other.id,
            NewLineType {
                name: "Foreign".to_string(),
                description: None,
            },
        )
        .await?;

    let err = fx
        .reorder()
        .move_node(
            fx.drawing_type_id,
            move_request(
                node(DepthClass::LineType, foreign.id, "0-0"),
                node(DepthClass::LineType, a.id, "0-0"),
                Disposition::After,
            ),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), CoreErrorKind::InvalidMove);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_line_type_name_is_rejected() -> Result<()> {
    let fx = Fixture::new().await?;
    fx.line_type("115kV").await?;

    let err = fx
        .line_types()
        .create(
            fx.drawing_type_id,
            NewLineType {
                name: "115kV".to_string(),
                description: Some("again".to_string()),
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), CoreErrorKind::Conflict);
    assert_eq!(line_types::Entity::find().all(&fx.db).await?.len(), 1);

    // renaming onto an existing name is rejected too
    let other = fx.line_type("230kV").await?;
    let err = fx
        .line_types()
        .update(
            other.id,
            LineTypeUpdate {
                name: Some(" 115kV ".to_string()),
                description: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Conflict);
    Ok(())
}

#[tokio::test]
async fn test_empty_name_is_rejected() -> Result<()> {
    let fx = Fixture::new().await?;
    let err = fx
        .line_types()
        .create(
            fx.drawing_type_id,
            NewLineType {
                name: "   ".to_string(),
                description: None,
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), CoreErrorKind::Validation);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_line_type_shifts_later_siblings() -> Result<()> {
    let fx = Fixture::new().await?;
    let (a, a_entries) = fx.line_type_with("A", &["a0", "a1"]).await?;
    fx.line_type("B").await?;
    fx.line_type("C").await?;

    let copy = fx.line_types().duplicate(a.id).await?;
    assert_eq!(copy.name, "A (copy)");
    assert_eq!(copy.index, 1);
    assert_eq!(
        fx.line_type_names().await?,
        vec!["A", "A (copy)", "B", "C"]
    );
    assert_eq!(fx.line_type_indices().await?, vec![0, 1, 2, 3]);

    let copied = siblings::children::<line_type_components::Entity, _>(&fx.db, copy.id).await?;
    assert_eq!(
        copied.iter().map(|e| e.component_id).collect::<Vec<_>>(),
        a_entries.iter().map(|e| e.component_id).collect::<Vec<_>>()
    );
    assert_eq!(fx.entry_indices(copy.id).await?, vec![0, 1]);

    let second = fx.line_types().duplicate(a.id).await?;
    assert_eq!(second.name, "A (copy 2)");
    assert_eq!(fx.line_type_indices().await?, vec![0, 1, 2, 3, 4]);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_line_type_component_shifts_later_siblings() -> Result<()> {
    let fx = Fixture::new().await?;
    let (line_type, entries) = fx.line_type_with("A", &["a0", "a1", "a2"]).await?;

    let copy = fx.entries().duplicate(entries[0].id).await?;

    assert_eq!(copy.index, 1);
    assert_eq!(copy.component_id, entries[0].component_id);
    assert_eq!(
        fx.entry_ids(line_type.id).await?,
        vec![entries[0].id, copy.id, entries[1].id, entries[2].id]
    );
    assert_eq!(fx.entry_indices(line_type.id).await?, vec![0, 1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn test_line_type_component_rules() -> Result<()> {
    let fx = Fixture::new().await?;
    let (line_type, entries) = fx.line_type_with("A", &["a0", "a1"]).await?;

    let err = fx
        .entries()
        .create(
            line_type.id,
            NewLineTypeComponent {
                component_id: entries[0].component_id,
                count: Some(2),
                component_type: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Conflict);

    let extra = fx.component("a2").await?;
    let err = fx
        .entries()
        .create(
            line_type.id,
            NewLineTypeComponent {
                component_id: extra.id,
                count: Some(0),
                component_type: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Validation);

    let err = fx
        .entries()
        .update(
            entries[1].id,
            LineTypeComponentUpdate {
                component_id: Some(entries[0].component_id),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Conflict);

    let err = fx
        .entries()
        .create(
            line_type.id,
            NewLineTypeComponent {
                component_id: 9999,
                count: None,
                component_type: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::NotFound);

    assert_eq!(fx.entry_indices(line_type.id).await?, vec![0, 1]);
    Ok(())
}

#[tokio::test]
async fn test_contiguity_after_mixed_operations() -> Result<()> {
    let fx = Fixture::new().await?;
    let (a, _) = fx.line_type_with("A", &["a0", "a1", "a2", "a3"]).await?;
    let (b, _) = fx.line_type_with("B", &["b0", "b1"]).await?;
    let c = fx.line_type("C").await?;

    let a_ids = fx.entry_ids(a.id).await?;
    let b_ids = fx.entry_ids(b.id).await?;

    fx.entries().duplicate(a_ids[2]).await?;
    fx.entries().delete(a_ids[0]).await?;

    let a_now = siblings::children::<line_type_components::Entity, _>(&fx.db, a.id).await?;
    fx.reorder()
        .move_node(
            fx.drawing_type_id,
            move_request(
                node(DepthClass::Component, a_now[3].id, "0-0-3"),
                node(DepthClass::Component, a_now[0].id, "0-0-0"),
                Disposition::Before,
            ),
        )
        .await?;
    fx.reorder()
        .move_node(
            fx.drawing_type_id,
            move_request(
                node(DepthClass::Component, b_ids[0], "0-1-0"),
                node(DepthClass::LineType, c.id, "0-2"),
                Disposition::Onto,
            ),
        )
        .await?;
    fx.line_types().duplicate(b.id).await?;
    let line_types = siblings::children::<line_types::Entity, _>(&fx.db, fx.drawing_type_id).await?;
    fx.reorder()
        .move_node(
            fx.drawing_type_id,
            move_request(
                node(DepthClass::LineType, line_types[0].id, "0-0"),
                node(DepthClass::LineType, line_types[3].id, "0-3"),
                Disposition::After,
            ),
        )
        .await?;
    fx.line_types().delete(b.id).await?;

    assert!(is_contiguous(&fx.line_type_indices().await?));
    for line_type in line_types::Entity::find().all(&fx.db).await? {
        assert!(
            is_contiguous(&fx.entry_indices(line_type.id).await?),
            "line type {} lost contiguity",
            line_type.name
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_drawing_type_delete_cascades() -> Result<()> {
    let fx = Fixture::new().await?;
    fx.line_type_with("A", &["a0", "a1"]).await?;
    fx.line_type_with("B", &["b0"]).await?;

    let tree = DrawingTypeService::new(fx.db.clone())
        .tree(fx.drawing_type_id)
        .await?;
    assert_eq!(tree.line_types.len(), 2);
    assert_eq!(tree.line_types[0].components.len(), 2);
    assert_eq!(
        tree.line_types[0].components[1]
            .component
            .as_ref()
            .map(|c| c.name.as_str()),
        Some("a1")
    );

    DrawingTypeService::new(fx.db.clone())
        .delete(fx.drawing_type_id)
        .await?;

    assert!(line_types::Entity::find().all(&fx.db).await?.is_empty());
    assert!(line_type_components::Entity::find()
        .all(&fx.db)
        .await?
        .is_empty());
    // the catalog is independent of the tree
    assert_eq!(components::Entity::find().all(&fx.db).await?.len(), 3);

    let err = DrawingTypeService::new(fx.db.clone())
        .get(fx.drawing_type_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::NotFound);
    Ok(())
}

#[tokio::test]
async fn test_component_catalog() -> Result<()> {
    let fx = Fixture::new().await?;
    let (_, entries) = fx.line_type_with("A", &["breaker"]).await?;
    let spare = fx.component("spare").await?;
    let last = fx.component("last").await?;

    let service = ComponentService::new(fx.db.clone());
    let err = service.delete(entries[0].component_id).await.unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Conflict);

    service.delete(spare.id).await?;
    let remaining = service.list(fx.version_id).await?;
    assert_eq!(
        remaining.iter().map(|c| c.index).collect::<Vec<_>>(),
        vec![0, 1]
    );
    assert_eq!(remaining[1].id, last.id);

    let err = service
        .create(
            fx.version_id,
            NewComponent {
                name: "bad".to_string(),
                description: None,
                color: "red".to_string(),
                part_id: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Validation);
    Ok(())
}

#[tokio::test]
async fn test_parts() -> Result<()> {
    let fx = Fixture::new().await?;
    let parts = PartService::new(fx.db.clone());
    let part = parts
        .create(NewPart {
            name: "Switchgear".to_string(),
            description: None,
        })
        .await?;

    let err = parts
        .create(NewPart {
            name: "Switchgear".to_string(),
            description: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Conflict);

    let component = ComponentService::new(fx.db.clone())
        .create(
            fx.version_id,
            NewComponent {
                name: "breaker".to_string(),
                description: None,
                color: "#abc".to_string(),
                part_id: Some(part.id),
            },
        )
        .await?;
    assert_eq!(component.color, "#ABC");

    parts.delete(part.id).await?;
    let component = ComponentService::new(fx.db.clone()).get(component.id).await?;
    assert_eq!(component.part_id, None);
    Ok(())
}

#[tokio::test]
async fn test_label_import_and_selection() -> Result<()> {
    let fx = Fixture::new().await?;
    let service = ComponentVersionService::new(fx.db.clone());

    let imported = service
        .import(LabelImport {
            version: NewComponentVersion {
                name: "2025 labels".to_string(),
                emoji: Some("⚡".to_string()),
                description: None,
            },
            labels: r##"<View>
  <Label value="115_breaker" background="#F20D7A"/>
  <Label value="foo"/>
  <Label value="disconnect" background="#00ff00"/>
</View>"##
                .to_string(),
        })
        .await?;

    assert_eq!(imported.components.len(), 2);
    assert_eq!(imported.components[0].name, "115_breaker");
    assert_eq!(imported.components[0].index, 0);
    assert_eq!(imported.components[1].color, "#00FF00");
    assert_eq!(imported.components[1].index, 1);

    let err = service
        .import(LabelImport {
            version: NewComponentVersion {
                name: "empty".to_string(),
                emoji: None,
                description: None,
            },
            labels: "<View/>".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Validation);

    assert!(service.selected().await?.is_none());
    service.select(fx.version_id).await?;
    service.select(imported.version.id).await?;

    let selected = service
        .list()
        .await?
        .into_iter()
        .filter(|version| version.selected)
        .collect::<Vec<_>>();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].id, imported.version.id);
    assert_eq!(
        service.selected().await?.map(|version| version.id),
        Some(imported.version.id)
    );
    Ok(())
}

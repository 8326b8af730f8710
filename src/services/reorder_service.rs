use std::sync::Arc;

use dashmap::DashMap;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use super::drawing_type_service::{find_drawing_type, load_component_views, LineTypeComponentView};
use super::line_type_component_service::{ensure_not_listed, find_line_type_component};
use super::line_type_service::find_line_type;
use super::siblings::{self, OrderedEntity};
use crate::database::entities::{line_type_components, line_types};
use crate::errors::{CoreError, CoreResult};
use crate::ordering::{
    allow_drop, plan_move, DepthClass, Disposition, DropTarget, Dragged, EditState, GapSide,
    MoveError, MovePlan, Slot, TreePosition,
};

/// One async mutex per drawing-type tree so moves on the same tree never
/// interleave inside this process.
#[derive(Default)]
pub struct TreeLocks {
    locks: DashMap<i32, Arc<Mutex<()>>>,
}

impl TreeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, drawing_type_id: i32) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(drawing_type_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Drop the lock of a tree nobody holds or waits on, e.g. once its
    /// drawing type is deleted
    pub fn forget(&self, drawing_type_id: i32) {
        self.locks
            .remove_if(&drawing_type_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    pub fn is_tracked(&self, drawing_type_id: i32) -> bool {
        self.locks.contains_key(&drawing_type_id)
    }
}

/// A tree node as the tree view reports it
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRef {
    pub kind: DepthClass,
    /// Line type id, or line type component id for `component` nodes
    pub id: i32,
    /// Depth-encoded position token before the move, e.g. `"0-2-1"`
    pub pos: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub drag: NodeRef,
    pub drop: NodeRef,
    pub disposition: Disposition,
    #[serde(default)]
    pub edit_state: EditState,
}

/// Current child list of a parent touched by a move
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RefreshedGroup {
    LineTypes {
        drawing_type_id: i32,
        children: Vec<line_types::Model>,
    },
    Components {
        line_type_id: i32,
        children: Vec<LineTypeComponentView>,
    },
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveOutcome {
    pub changed: bool,
    pub affected_parents: Vec<i32>,
    pub groups: Vec<RefreshedGroup>,
}

/// A node loaded from the store together with the slot it occupies
struct ResolvedNode {
    id: i32,
    slot: Slot,
    /// Catalog component of a line type component node
    component_id: Option<i32>,
}

#[derive(Clone)]
pub struct ReorderService {
    db: DatabaseConnection,
    locks: Arc<TreeLocks>,
}

impl ReorderService {
    pub fn new(db: DatabaseConnection, locks: Arc<TreeLocks>) -> Self {
        Self { db, locks }
    }

    /// Apply a drag and drop gesture on the tree of `drawing_type_id`.
    ///
    /// The request is checked completely before the first write: position
    /// tokens must parse and agree with the node kinds, the drop shape must be
    /// allowed, and every token index must still match the stored index.
    pub async fn move_node(
        &self,
        drawing_type_id: i32,
        request: MoveRequest,
    ) -> CoreResult<MoveOutcome> {
        if !request.edit_state.allows_drag() {
            return Err(CoreError::invalid_move(
                "Finish the pending edit before reordering the tree",
            ));
        }

        let drag_pos = parse_position(&request.drag)?;
        let drop_pos = parse_position(&request.drop)?;
        if !allow_drop(request.drag.kind, request.drop.kind, request.disposition) {
            return Err(MoveError::IncompatibleDrop {
                drag: request.drag.kind,
                drop: request.drop.kind,
                disposition: request.disposition,
            }
            .into());
        }

        // unknown trees never get a lock entry
        find_drawing_type(&self.db, drawing_type_id).await?;
        let _guard = self.locks.acquire(drawing_type_id).await;
        let txn = self.db.begin().await?;
        find_drawing_type(&txn, drawing_type_id).await?;

        let dragged = resolve(&txn, drawing_type_id, &request.drag, &drag_pos).await?;
        let landing = resolve(&txn, drawing_type_id, &request.drop, &drop_pos).await?;

        // a component may be listed only once per line type
        if let Some(component_id) = dragged.component_id {
            let destination = match request.disposition {
                Disposition::Onto => landing.id,
                Disposition::Before | Disposition::After => landing.slot.parent_id,
            };
            if destination != dragged.slot.parent_id {
                ensure_not_listed(&txn, destination, component_id, Some(dragged.id)).await?;
            }
        }

        let target = match request.disposition {
            Disposition::Onto => DropTarget::Container {
                parent_id: landing.id,
            },
            Disposition::Before | Disposition::After => {
                let sibling_count = match request.drop.kind {
                    DepthClass::LineType => {
                        sibling_count::<line_types::Entity, _>(&txn, landing.slot.parent_id).await?
                    }
                    DepthClass::Component => {
                        sibling_count::<line_type_components::Entity, _>(
                            &txn,
                            landing.slot.parent_id,
                        )
                        .await?
                    }
                };
                let side = if request.disposition == Disposition::Before {
                    GapSide::Before
                } else {
                    GapSide::After
                };
                DropTarget::Gap {
                    sibling: landing.slot,
                    side,
                    sibling_count,
                }
            }
        };

        let plan = plan_move(
            Dragged {
                id: dragged.id,
                slot: dragged.slot,
            },
            target,
        )?;

        if plan.is_noop() {
            debug!(
                "Move of {} {} resolved to its current slot, nothing written",
                request.drag.kind, dragged.id
            );
            txn.commit().await?;
            let groups = self
                .refresh(request.drag.kind, &[dragged.slot.parent_id])
                .await?;
            return Ok(MoveOutcome {
                changed: false,
                affected_parents: Vec::new(),
                groups,
            });
        }

        let affected_parents = plan.affected_parents();
        match request.drag.kind {
            DepthClass::LineType => {
                execute::<line_types::Entity, _>(&txn, &plan, &affected_parents).await?
            }
            DepthClass::Component => {
                execute::<line_type_components::Entity, _>(&txn, &plan, &affected_parents).await?
            }
        }
        txn.commit().await?;

        info!(
            "Moved {} {} in drawing type {} ({} steps, parents {:?})",
            request.drag.kind,
            dragged.id,
            drawing_type_id,
            plan.steps().len(),
            affected_parents
        );

        let groups = self.refresh(request.drag.kind, &affected_parents).await?;
        Ok(MoveOutcome {
            changed: true,
            affected_parents,
            groups,
        })
    }

    async fn refresh(&self, kind: DepthClass, parents: &[i32]) -> CoreResult<Vec<RefreshedGroup>> {
        let mut groups = Vec::with_capacity(parents.len());
        for &parent_id in parents {
            let group = match kind {
                DepthClass::LineType => RefreshedGroup::LineTypes {
                    drawing_type_id: parent_id,
                    children: siblings::children::<line_types::Entity, _>(&self.db, parent_id)
                        .await?,
                },
                DepthClass::Component => RefreshedGroup::Components {
                    line_type_id: parent_id,
                    children: load_component_views(&self.db, vec![parent_id]).await?,
                },
            };
            groups.push(group);
        }
        Ok(groups)
    }
}

fn parse_position(node: &NodeRef) -> CoreResult<TreePosition> {
    let position: TreePosition = node.pos.parse()?;
    let described = position.depth_class()?;
    if described != node.kind {
        return Err(MoveError::KindMismatch {
            expected: described,
            actual: node.kind,
        }
        .into());
    }
    Ok(position)
}

fn token_index(raw: usize, node: &NodeRef) -> CoreResult<i32> {
    i32::try_from(raw).map_err(|_| MoveError::MalformedPosition(node.pos.clone()).into())
}

fn ensure_fresh(stored: i32, raw: usize, node: &NodeRef) -> CoreResult<()> {
    if token_index(raw, node)? != stored {
        warn!(
            "Rejecting move: {} {} is at index {}, client sent '{}'",
            node.kind, node.id, stored, node.pos
        );
        return Err(MoveError::StalePosition {
            token: node.pos.clone(),
            stored,
        }
        .into());
    }
    Ok(())
}

/// Load the node, confirm it hangs off `drawing_type_id`, and check that the
/// client's position token still describes where it is stored.
async fn resolve<C: ConnectionTrait>(
    conn: &C,
    drawing_type_id: i32,
    node: &NodeRef,
    position: &TreePosition,
) -> CoreResult<ResolvedNode> {
    match node.kind {
        DepthClass::LineType => {
            let line_type = find_line_type(conn, node.id).await?;
            if line_type.drawing_type_id != drawing_type_id {
                return Err(foreign_node(node, drawing_type_id));
            }
            ensure_fresh(line_type.index, position.index(), node)?;
            Ok(ResolvedNode {
                id: line_type.id,
                slot: Slot {
                    parent_id: line_type.drawing_type_id,
                    index: line_type.index,
                },
                component_id: None,
            })
        }
        DepthClass::Component => {
            let entry = find_line_type_component(conn, node.id).await?;
            let line_type = find_line_type(conn, entry.line_type_id).await?;
            if line_type.drawing_type_id != drawing_type_id {
                return Err(foreign_node(node, drawing_type_id));
            }
            if let Some(parent_index) = position.parent_index() {
                ensure_fresh(line_type.index, parent_index, node)?;
            }
            ensure_fresh(entry.index, position.index(), node)?;
            Ok(ResolvedNode {
                id: entry.id,
                slot: Slot {
                    parent_id: entry.line_type_id,
                    index: entry.index,
                },
                component_id: Some(entry.component_id),
            })
        }
    }
}

fn foreign_node(node: &NodeRef, drawing_type_id: i32) -> CoreError {
    CoreError::invalid_move(format!(
        "The {} {} does not belong to drawing type {}",
        node.kind, node.id, drawing_type_id
    ))
    .with_field("id", node.id.to_string())
    .with_field("drawingTypeId", drawing_type_id.to_string())
}

async fn sibling_count<E, C>(conn: &C, parent_id: i32) -> CoreResult<i32>
where
    E: OrderedEntity,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let count = siblings::count::<E, C>(conn, parent_id).await?;
    i32::try_from(count).map_err(|_| CoreError::internal("Sibling group too large"))
}

async fn execute<E, C>(conn: &C, plan: &MovePlan, parents: &[i32]) -> CoreResult<()>
where
    E: OrderedEntity,
    C: ConnectionTrait,
{
    siblings::apply_plan::<E, C>(conn, plan).await?;
    siblings::ensure_contiguous::<E, C>(conn, parents).await?;
    Ok(())
}

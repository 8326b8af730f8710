//! Index bookkeeping shared by every ordered sibling group.
//!
//! Renumbering is done with single range updates
//! (`UPDATE .. SET index = index + delta WHERE parent = ? AND index BETWEEN ..`)
//! so callers only need one statement per shifted range, and all of it runs on
//! whatever connection or transaction the caller passes in.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

use crate::database::entities::{components, line_type_components, line_types};
use crate::ordering::{is_contiguous, IndexShift, MovePlan, Relocate, Step};

/// An entity whose rows form ordered sibling groups under a parent id
pub trait OrderedEntity: EntityTrait {
    const NAME: &'static str;

    fn id_column() -> Self::Column;
    fn parent_column() -> Self::Column;
    fn index_column() -> Self::Column;
    fn updated_at_column() -> Self::Column;

    fn id_of(model: &Self::Model) -> i32;
    fn parent_of(model: &Self::Model) -> i32;
    fn index_of(model: &Self::Model) -> i32;
}

impl OrderedEntity for line_types::Entity {
    const NAME: &'static str = "LineType";

    fn id_column() -> Self::Column {
        line_types::Column::Id
    }
    fn parent_column() -> Self::Column {
        line_types::Column::DrawingTypeId
    }
    fn index_column() -> Self::Column {
        line_types::Column::Index
    }
    fn updated_at_column() -> Self::Column {
        line_types::Column::UpdatedAt
    }
    fn id_of(model: &Self::Model) -> i32 {
        model.id
    }
    fn parent_of(model: &Self::Model) -> i32 {
        model.drawing_type_id
    }
    fn index_of(model: &Self::Model) -> i32 {
        model.index
    }
}

impl OrderedEntity for line_type_components::Entity {
    const NAME: &'static str = "LineTypeComponent";

    fn id_column() -> Self::Column {
        line_type_components::Column::Id
    }
    fn parent_column() -> Self::Column {
        line_type_components::Column::LineTypeId
    }
    fn index_column() -> Self::Column {
        line_type_components::Column::Index
    }
    fn updated_at_column() -> Self::Column {
        line_type_components::Column::UpdatedAt
    }
    fn id_of(model: &Self::Model) -> i32 {
        model.id
    }
    fn parent_of(model: &Self::Model) -> i32 {
        model.line_type_id
    }
    fn index_of(model: &Self::Model) -> i32 {
        model.index
    }
}

impl OrderedEntity for components::Entity {
    const NAME: &'static str = "Component";

    fn id_column() -> Self::Column {
        components::Column::Id
    }
    fn parent_column() -> Self::Column {
        components::Column::ComponentVersionId
    }
    fn index_column() -> Self::Column {
        components::Column::Index
    }
    fn updated_at_column() -> Self::Column {
        components::Column::UpdatedAt
    }
    fn id_of(model: &Self::Model) -> i32 {
        model.id
    }
    fn parent_of(model: &Self::Model) -> i32 {
        model.component_version_id
    }
    fn index_of(model: &Self::Model) -> i32 {
        model.index
    }
}

/// Children of `parent_id` ordered by index
pub async fn children<E, C>(conn: &C, parent_id: i32) -> Result<Vec<E::Model>, DbErr>
where
    E: OrderedEntity,
    C: ConnectionTrait,
{
    E::find()
        .filter(E::parent_column().eq(parent_id))
        .order_by_asc(E::index_column())
        .order_by_asc(E::id_column())
        .all(conn)
        .await
}

/// Index a newly appended child receives: one past the current maximum
pub async fn next_index<E, C>(conn: &C, parent_id: i32) -> Result<i32, DbErr>
where
    E: OrderedEntity,
    C: ConnectionTrait,
{
    let last = E::find()
        .filter(E::parent_column().eq(parent_id))
        .order_by_desc(E::index_column())
        .one(conn)
        .await?;

    Ok(last.map_or(0, |model| E::index_of(&model) + 1))
}

pub async fn count<E, C>(conn: &C, parent_id: i32) -> Result<u64, DbErr>
where
    E: OrderedEntity,
    E::Model: Sync,
    C: ConnectionTrait,
{
    E::find()
        .filter(E::parent_column().eq(parent_id))
        .count(conn)
        .await
}

pub async fn indices<E, C>(conn: &C, parent_id: i32) -> Result<Vec<i32>, DbErr>
where
    E: OrderedEntity,
    C: ConnectionTrait,
{
    Ok(children::<E, C>(conn, parent_id)
        .await?
        .iter()
        .map(E::index_of)
        .collect())
}

pub async fn shift<E, C>(conn: &C, shift: &IndexShift) -> Result<u64, DbErr>
where
    E: OrderedEntity,
    C: ConnectionTrait,
{
    let mut condition = Condition::all()
        .add(E::parent_column().eq(shift.parent_id))
        .add(E::index_column().gte(shift.start));
    if let Some(end) = shift.end {
        condition = condition.add(E::index_column().lte(end));
    }
    if let Some(exclude) = shift.exclude {
        condition = condition.add(E::id_column().ne(exclude));
    }

    let result = E::update_many()
        .col_expr(
            E::index_column(),
            Expr::col(E::index_column()).add(shift.delta),
        )
        .filter(condition)
        .exec(conn)
        .await?;

    Ok(result.rows_affected)
}

pub async fn relocate<E, C>(conn: &C, relocate: &Relocate) -> Result<(), DbErr>
where
    E: OrderedEntity,
    C: ConnectionTrait,
{
    let result = E::update_many()
        .col_expr(E::parent_column(), Expr::value(relocate.parent_id))
        .col_expr(E::index_column(), Expr::value(relocate.index))
        .col_expr(E::updated_at_column(), Expr::value(Utc::now()))
        .filter(E::id_column().eq(relocate.id))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(DbErr::RecordNotFound(format!(
            "{} {} not found",
            E::NAME,
            relocate.id
        )));
    }
    Ok(())
}

/// Close the gap left by a removed child at `index`
pub async fn compact_after<E, C>(conn: &C, parent_id: i32, index: i32) -> Result<u64, DbErr>
where
    E: OrderedEntity,
    C: ConnectionTrait,
{
    shift::<E, C>(
        conn,
        &IndexShift {
            parent_id,
            start: index + 1,
            end: None,
            delta: -1,
            exclude: None,
        },
    )
    .await
}

/// Make room for a child inserted at `index`
pub async fn open_gap_at<E, C>(conn: &C, parent_id: i32, index: i32) -> Result<u64, DbErr>
where
    E: OrderedEntity,
    C: ConnectionTrait,
{
    shift::<E, C>(
        conn,
        &IndexShift {
            parent_id,
            start: index,
            end: None,
            delta: 1,
            exclude: None,
        },
    )
    .await
}

pub async fn apply_plan<E, C>(conn: &C, plan: &MovePlan) -> Result<(), DbErr>
where
    E: OrderedEntity,
    C: ConnectionTrait,
{
    for step in plan.steps() {
        match step {
            Step::Shift(range) => {
                shift::<E, C>(conn, range).await?;
            }
            Step::Relocate(target) => relocate::<E, C>(conn, target).await?,
        }
    }
    Ok(())
}

/// Fails when any of `parents` no longer holds indices `0..n`
pub async fn ensure_contiguous<E, C>(conn: &C, parents: &[i32]) -> Result<(), DbErr>
where
    E: OrderedEntity,
    C: ConnectionTrait,
{
    for parent_id in parents {
        let current = indices::<E, C>(conn, *parent_id).await?;
        if !is_contiguous(&current) {
            return Err(DbErr::Custom(format!(
                "{} indices under parent {} are not contiguous: {:?}",
                E::NAME,
                parent_id,
                current
            )));
        }
    }
    Ok(())
}

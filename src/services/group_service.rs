//! Group ordering extension point.
//!
//! Orders can be flagged as group orders, and the `group_orders` /
//! `group_members` tables can hold a shared code with its member students.
//! No rules exist yet for generating codes, joining a group or splitting a
//! total, so placement only records the flag and hands the requested members
//! to [`attach_group_members`], which writes nothing. Listings read back
//! whatever group rows exist (the seed tool writes one).

use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::{
    entity::{
        group_members::{Column as MemberCol, Entity as GroupMembers},
        group_orders::{Column as GroupCol, Entity as GroupOrders},
        orders::Model as OrderModel,
        users::Entity as Users,
    },
    error::AppResult,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupSummary {
    pub group_code: String,
    pub members: Vec<String>,
}

/// Called for every order placed with `isGroupOrder = true`.
pub fn attach_group_members(order: &OrderModel, members: &[String]) {
    tracing::debug!(
        order_id = order.id,
        requested_members = ?members,
        "group order placed; membership is not persisted"
    );
}

/// Group code and member student ids keyed by order id.
pub async fn load_groups<C: ConnectionTrait>(
    conn: &C,
    order_ids: &[i32],
) -> AppResult<HashMap<i32, GroupSummary>> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let groups = GroupOrders::find()
        .filter(GroupCol::OrderId.is_in(order_ids.iter().copied()))
        .all(conn)
        .await?;
    if groups.is_empty() {
        return Ok(HashMap::new());
    }

    let group_ids: Vec<i32> = groups.iter().map(|g| g.id).collect();
    let rows = GroupMembers::find()
        .filter(MemberCol::GroupOrderId.is_in(group_ids))
        .find_also_related(Users)
        .order_by_asc(MemberCol::Id)
        .all(conn)
        .await?;

    let mut members: HashMap<i32, Vec<String>> = HashMap::new();
    for (member, user) in rows {
        if let Some(user) = user {
            members
                .entry(member.group_order_id)
                .or_default()
                .push(user.student_id);
        }
    }

    Ok(groups
        .into_iter()
        .map(|group| {
            let summary = GroupSummary {
                members: members.remove(&group.id).unwrap_or_default(),
                group_code: group.group_code,
            };
            (group.order_id, summary)
        })
        .collect())
}

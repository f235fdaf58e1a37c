//! Record assembly
//!
//! Zips a message's parallel item sequences into one record per line item.

use crate::error::{ExtractError, Result};
use crate::scanner::PerMessageScan;
use crate::types::{MessageMeta, OrderItemRecord};

/// Build one record per captured item id.
///
/// Names and quantities are matched to ids by position, so the three
/// sequences must have the same length; otherwise the whole message fails
/// with [`ExtractError::MisalignedItems`].
pub fn assemble(scan: PerMessageScan, meta: &MessageMeta) -> Result<Vec<OrderItemRecord>> {
    if scan.item_count().is_none() {
        return Err(ExtractError::MisalignedItems {
            message_id: meta.message_id.to_string(),
            item_ids: scan.item_ids.len(),
            item_names: scan.item_names.len(),
            item_quantities: scan.item_quantities.len(),
        });
    }

    let PerMessageScan {
        item_ids,
        item_names,
        item_quantities,
        tracking_id,
        ship_to,
        ..
    } = scan;

    Ok(item_ids
        .into_iter()
        .zip(item_names)
        .zip(item_quantities)
        .map(|((item_id, item_name), item_quantity)| OrderItemRecord {
            received: meta.received,
            item_name,
            item_id,
            item_quantity,
            tracking_id: tracking_id.clone(),
            ship_to: ship_to.clone(),
            message_id: meta.message_id.clone(),
            recipient: meta.recipient.clone(),
        })
        .collect())
}

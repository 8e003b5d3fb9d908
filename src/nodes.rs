//! Ordering of storage-node listings for the cluster overview page.
//!
//! The rendering layer owns the table markup; this module only sorts the
//! rows. Sort field and order arrive as raw request strings and fall back to
//! hostname / ascending when unrecognized.

use serde::{Deserialize, Serialize};

/// One row of the storage-node listing, as reported by the cluster manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageNodeInfo {
    pub host_name: String,
    /// Seconds since the node last heartbeated.
    pub last_contact: u64,
    pub capacity: u64,
    pub dfs_used: u64,
    pub non_dfs_used: u64,
    pub remaining: u64,
    pub blocks: u64,
}

impl StorageNodeInfo {
    pub fn dfs_used_percent(&self) -> f64 {
        percent_of(self.dfs_used, self.capacity)
    }

    pub fn remaining_percent(&self) -> f64 {
        percent_of(self.remaining, self.capacity)
    }
}

fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    LastContact,
    Blocks,
    Capacity,
    Used,
    NonDfsUsed,
    Remaining,
    PercentUsed,
    PercentRemaining,
}

impl SortField {
    /// Parses the `sorter/field` request parameter; anything unrecognized
    /// sorts by hostname.
    pub fn parse(field: &str) -> Self {
        match field {
            "lastcontact" => SortField::LastContact,
            "blocks" => SortField::Blocks,
            "capacity" => SortField::Capacity,
            "used" => SortField::Used,
            "nondfsused" => SortField::NonDfsUsed,
            "remaining" => SortField::Remaining,
            "pcused" => SortField::PercentUsed,
            "pcremaining" => SortField::PercentRemaining,
            _ => SortField::Name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// Parses the `sorter/order` request parameter; only `"DSC"` descends.
    pub fn parse(order: &str) -> Self {
        if order == "DSC" {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }
}

/// Sorts the listing in place. Ascending last-contact order puts the most
/// recently heard-from nodes first.
pub fn sort_node_list(nodes: &mut [StorageNodeInfo], field: SortField, order: SortOrder) {
    nodes.sort_by(|a, b| {
        let ordering = match field {
            SortField::Name => a.host_name.cmp(&b.host_name),
            SortField::LastContact => a.last_contact.cmp(&b.last_contact),
            SortField::Blocks => a.blocks.cmp(&b.blocks),
            SortField::Capacity => a.capacity.cmp(&b.capacity),
            SortField::Used => a.dfs_used.cmp(&b.dfs_used),
            SortField::NonDfsUsed => a.non_dfs_used.cmp(&b.non_dfs_used),
            SortField::Remaining => a.remaining.cmp(&b.remaining),
            SortField::PercentUsed => a
                .dfs_used_percent()
                .partial_cmp(&b.dfs_used_percent())
                .unwrap_or(std::cmp::Ordering::Equal),
            SortField::PercentRemaining => a
                .remaining_percent()
                .partial_cmp(&b.remaining_percent())
                .unwrap_or(std::cmp::Ordering::Equal),
        };
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(host: &str, capacity: u64, dfs_used: u64, blocks: u64) -> StorageNodeInfo {
        StorageNodeInfo {
            host_name: host.to_string(),
            last_contact: 3,
            capacity,
            dfs_used,
            non_dfs_used: 0,
            remaining: capacity - dfs_used,
            blocks,
        }
    }

    #[test]
    fn unknown_field_falls_back_to_name() {
        assert_eq!(SortField::parse("bogus"), SortField::Name);
        assert_eq!(SortField::parse("pcused"), SortField::PercentUsed);
        assert_eq!(SortOrder::parse("ASC"), SortOrder::Ascending);
        assert_eq!(SortOrder::parse("DSC"), SortOrder::Descending);
    }

    #[test]
    fn sorts_by_capacity_descending() {
        let mut nodes = vec![
            node("dn2", 100, 10, 5),
            node("dn1", 300, 30, 1),
            node("dn3", 200, 20, 9),
        ];
        sort_node_list(&mut nodes, SortField::Capacity, SortOrder::Descending);
        let hosts: Vec<&str> = nodes.iter().map(|n| n.host_name.as_str()).collect();
        assert_eq!(hosts, ["dn1", "dn3", "dn2"]);
    }

    #[test]
    fn percent_sort_is_capacity_relative() {
        // dn1 uses fewer absolute bytes but a larger share of its capacity.
        let mut nodes = vec![node("dn1", 100, 50, 0), node("dn2", 1000, 100, 0)];
        sort_node_list(&mut nodes, SortField::PercentUsed, SortOrder::Ascending);
        assert_eq!(nodes[0].host_name, "dn2");
        assert_eq!(nodes[1].host_name, "dn1");
    }

    #[test]
    fn zero_capacity_node_reports_zero_percent() {
        let empty = node("dn0", 0, 0, 0);
        assert_eq!(empty.dfs_used_percent(), 0.0);
        assert_eq!(empty.remaining_percent(), 0.0);
    }
}

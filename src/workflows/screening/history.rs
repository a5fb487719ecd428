use std::collections::HashMap;

use super::domain::{BodyId, Tender, VendorId};

/// Bid and win counts for one (vendor, awarding body) pair within the batch
/// window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BidStats {
    pub total: u32,
    pub wins: u32,
}

impl BidStats {
    /// Win rate over the recorded bids; zero when no bids are recorded.
    pub fn win_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(self.total)
        }
    }
}

/// Per-batch vendor history aggregates. Built in a single pass during the
/// Aggregating phase and treated as read-only for the rest of the batch; a
/// fresh table is built for every run, so concurrent runs never interfere.
#[derive(Debug, Clone, Default)]
pub struct VendorHistoryTable {
    stats: HashMap<(VendorId, BodyId), BidStats>,
}

impl VendorHistoryTable {
    /// Fold bid and win counts over the normalized tender collection.
    pub fn build(tenders: &[Tender]) -> Self {
        let mut table = Self::default();
        for tender in tenders {
            for bidder in &tender.bidders {
                let entry = table
                    .stats
                    .entry((bidder.clone(), tender.body.id.clone()))
                    .or_default();
                entry.total += 1;
                if tender.winning_vendor.as_ref() == Some(bidder) {
                    entry.wins += 1;
                }
            }
            // A recorded winner absent from the bidder list still counts as
            // one bid and one win.
            if let Some(winner) = &tender.winning_vendor {
                if !tender.bidders.contains(winner) {
                    let entry = table
                        .stats
                        .entry((winner.clone(), tender.body.id.clone()))
                        .or_default();
                    entry.total += 1;
                    entry.wins += 1;
                }
            }
        }
        table
    }

    /// Seed an aggregate directly; used when history comes from an external
    /// record system rather than the batch itself.
    pub fn insert(&mut self, vendor: VendorId, body: BodyId, stats: BidStats) {
        self.stats.insert((vendor, body), stats);
    }

    pub fn get(&self, vendor: &VendorId, body: &BodyId) -> BidStats {
        self.stats
            .get(&(vendor.clone(), body.clone()))
            .copied()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::screening::domain::{AwardingBody, TenderId};

    fn tender(id: &str, body: &str, bidders: &[&str], winner: Option<&str>) -> Tender {
        Tender {
            id: TenderId(id.to_string()),
            category: "notebook".to_string(),
            estimated_value: 1_000.0,
            homologated_value: None,
            specification: String::new(),
            body: AwardingBody {
                id: BodyId(body.to_string()),
                name: body.to_string(),
                region: "SP".to_string(),
            },
            winning_vendor: winner.map(|v| VendorId(v.to_string())),
            bidders: bidders.iter().map(|v| VendorId(v.to_string())).collect(),
            participant_count: bidders.len() as u32,
        }
    }

    #[test]
    fn empty_history_has_zero_win_rate() {
        let table = VendorHistoryTable::default();
        let stats = table.get(&VendorId("v".to_string()), &BodyId("b".to_string()));
        assert_eq!(stats.total, 0);
        assert_eq!(stats.win_rate(), 0.0);
    }

    #[test]
    fn counts_bids_and_wins_per_pair() {
        let tenders = vec![
            tender("t1", "org-1", &["v1", "v2"], Some("v1")),
            tender("t2", "org-1", &["v1", "v2"], Some("v1")),
            tender("t3", "org-1", &["v1", "v2"], Some("v2")),
        ];
        let table = VendorHistoryTable::build(&tenders);

        let v1 = table.get(&VendorId("v1".to_string()), &BodyId("org-1".to_string()));
        assert_eq!((v1.total, v1.wins), (3, 2));
        let v2 = table.get(&VendorId("v2".to_string()), &BodyId("org-1".to_string()));
        assert_eq!((v2.total, v2.wins), (3, 1));
    }

    #[test]
    fn bodies_are_aggregated_independently() {
        let tenders = vec![
            tender("t1", "org-1", &["v1"], Some("v1")),
            tender("t2", "org-2", &["v1"], None),
        ];
        let table = VendorHistoryTable::build(&tenders);

        let at_one = table.get(&VendorId("v1".to_string()), &BodyId("org-1".to_string()));
        assert_eq!(at_one.win_rate(), 1.0);
        let at_two = table.get(&VendorId("v1".to_string()), &BodyId("org-2".to_string()));
        assert_eq!(at_two.win_rate(), 0.0);
    }

    #[test]
    fn winner_missing_from_bidder_list_still_counts() {
        let tenders = vec![tender("t1", "org-1", &["v2"], Some("v1"))];
        let table = VendorHistoryTable::build(&tenders);
        let stats = table.get(&VendorId("v1".to_string()), &BodyId("org-1".to_string()));
        assert_eq!((stats.total, stats.wins), (1, 1));
    }
}

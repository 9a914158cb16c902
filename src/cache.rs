// src/cache.rs
use std::collections::HashMap;

use alloy::primitives::Address;

use crate::models::{Approval, TokenPosition};

/// Last observed positions and approvals.
///
/// Every read overwrites its entry; nothing expires on its own. Owned by the
/// caller, who decides when to invalidate.
#[derive(Debug, Default, Clone)]
pub struct StateCache {
    positions: HashMap<Address, Vec<TokenPosition>>,
    // keyed by (token, owner)
    approvals: HashMap<(Address, Address), Vec<Approval>>,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positions(&self, account: Address) -> Option<&[TokenPosition]> {
        self.positions.get(&account).map(Vec::as_slice)
    }

    pub fn store_positions(&mut self, account: Address, positions: Vec<TokenPosition>) {
        self.positions.insert(account, positions);
    }

    pub fn approvals(&self, token: Address, owner: Address) -> Option<&[Approval]> {
        self.approvals.get(&(token, owner)).map(Vec::as_slice)
    }

    pub fn store_approvals(&mut self, token: Address, owner: Address, approvals: Vec<Approval>) {
        self.approvals.insert((token, owner), approvals);
    }

    /// Drop everything cached for `account`, positions and approvals alike.
    pub fn invalidate_account(&mut self, account: Address) {
        self.positions.remove(&account);
        self.approvals.retain(|(_, owner), _| *owner != account);
    }

    pub fn invalidate_approvals(&mut self, token: Address, owner: Address) {
        self.approvals.remove(&(token, owner));
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.approvals.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.approvals.is_empty()
    }
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Favorite rate types and their optimistic reordering.
//!
//! The local order is changed first, then persisted. If persistence fails the
//! view goes back to the snapshot taken before the change and the error is
//! handed to the caller.

use serde::{Deserialize, Serialize};

use super::currency::CurrencyCode;
use super::error::{FxError, FxResult};
use super::rates::RateType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteMark {
    pub id: i64,
    pub currency: CurrencyCode,
    pub rate_type: RateType,
    pub position: usize,
}

/// Persistence for favorites, implemented by whoever owns storage.
pub trait FavoritesStore {
    fn list_favorites(&self, user: &str) -> FxResult<Vec<FavoriteMark>>;
    fn reorder(&self, user: &str, ordered_ids: &[i64]) -> FxResult<()>;
    /// Returns the mark when the pair became a favorite, `None` when it was removed.
    fn toggle_favorite(
        &self,
        user: &str,
        currency: &CurrencyCode,
        rate_type: &RateType,
    ) -> FxResult<Option<FavoriteMark>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderState {
    Idle,
    Pending(Vec<FavoriteMark>),
    Committed,
    RolledBack(Vec<FavoriteMark>),
}

/// Moves the item at `from` to `to`, shifting the rest.
pub fn move_favorite(marks: &[FavoriteMark], from: usize, to: usize) -> FxResult<Vec<FavoriteMark>> {
    if from >= marks.len() || to >= marks.len() {
        return Err(FxError::InvalidReorder(format!(
            "positions {from} -> {to} out of range for {} favorites",
            marks.len()
        )));
    }
    let mut out = marks.to_vec();
    let item = out.remove(from);
    out.insert(to, item);
    Ok(renumber(out))
}

fn renumber(mut marks: Vec<FavoriteMark>) -> Vec<FavoriteMark> {
    for (i, m) in marks.iter_mut().enumerate() {
        m.position = i;
    }
    marks
}

/// A user's local view of their favorites.
#[derive(Debug, Clone)]
pub struct FavoritesView {
    user: String,
    marks: Vec<FavoriteMark>,
    state: ReorderState,
}

impl FavoritesView {
    pub fn new(user: impl Into<String>, marks: Vec<FavoriteMark>) -> Self {
        Self {
            user: user.into(),
            marks,
            state: ReorderState::Idle,
        }
    }

    pub fn load(store: &dyn FavoritesStore, user: &str) -> FxResult<Self> {
        Ok(Self::new(user, store.list_favorites(user)?))
    }

    pub fn marks(&self) -> &[FavoriteMark] {
        &self.marks
    }

    pub fn state(&self) -> &ReorderState {
        &self.state
    }

    pub fn ids(&self) -> Vec<i64> {
        self.marks.iter().map(|m| m.id).collect()
    }

    /// Favorite types for one currency, in order.
    pub fn types_for(&self, currency: &CurrencyCode) -> Vec<RateType> {
        self.marks
            .iter()
            .filter(|m| &m.currency == currency)
            .map(|m| m.rate_type.clone())
            .collect()
    }

    /// Applies `ordered_ids` locally and remembers the previous order.
    pub fn begin_reorder(&mut self, ordered_ids: &[i64]) -> FxResult<()> {
        if matches!(self.state, ReorderState::Pending(_)) {
            return Err(FxError::InvalidReorder("a reorder is already pending".into()));
        }
        if ordered_ids.len() != self.marks.len() {
            return Err(FxError::InvalidReorder(format!(
                "expected {} ids, got {}",
                self.marks.len(),
                ordered_ids.len()
            )));
        }
        let mut next = Vec::with_capacity(self.marks.len());
        for id in ordered_ids {
            if next.iter().any(|m: &FavoriteMark| m.id == *id) {
                return Err(FxError::InvalidReorder(format!("duplicate id {id}")));
            }
            let m = self
                .marks
                .iter()
                .find(|m| m.id == *id)
                .ok_or_else(|| FxError::InvalidReorder(format!("unknown id {id}")))?;
            next.push(m.clone());
        }
        let snapshot = std::mem::replace(&mut self.marks, renumber(next));
        self.state = ReorderState::Pending(snapshot);
        Ok(())
    }

    pub fn commit(&mut self) {
        if matches!(self.state, ReorderState::Pending(_)) {
            self.state = ReorderState::Committed;
        }
    }

    pub fn rollback(&mut self) {
        if let ReorderState::Pending(snapshot) =
            std::mem::replace(&mut self.state, ReorderState::Idle)
        {
            let current = std::mem::replace(&mut self.marks, snapshot.clone());
            tracing::warn!(user = %self.user, discarded = ?current.iter().map(|m| m.id).collect::<Vec<_>>(), "favorites reorder rolled back");
            self.state = ReorderState::RolledBack(snapshot);
        }
    }

    /// Optimistically reorders, then persists; rolls back and reports on failure.
    pub fn reorder_with(&mut self, store: &dyn FavoritesStore, ordered_ids: &[i64]) -> FxResult<()> {
        self.begin_reorder(ordered_ids)?;
        match store.reorder(&self.user, &self.ids()) {
            Ok(()) => {
                self.commit();
                Ok(())
            }
            Err(e) => {
                self.rollback();
                Err(into_persistence(e))
            }
        }
    }

    /// Moves one favorite and persists the new order.
    pub fn move_with(&mut self, store: &dyn FavoritesStore, from: usize, to: usize) -> FxResult<()> {
        let ids: Vec<i64> = move_favorite(&self.marks, from, to)?
            .iter()
            .map(|m| m.id)
            .collect();
        self.reorder_with(store, &ids)
    }

    /// Optimistically toggles a favorite, restoring the previous list on failure.
    ///
    /// On success the local list follows the store's answer, not the guess.
    pub fn toggle_with(
        &mut self,
        store: &dyn FavoritesStore,
        currency: &CurrencyCode,
        rate_type: &RateType,
    ) -> FxResult<bool> {
        if matches!(self.state, ReorderState::Pending(_)) {
            return Err(FxError::InvalidReorder("a reorder is already pending".into()));
        }
        let snapshot = self.marks.clone();
        let existing = self
            .marks
            .iter()
            .position(|m| &m.currency == currency && &m.rate_type == rate_type);
        match existing {
            Some(i) => {
                self.marks.remove(i);
            }
            None => self.marks.push(FavoriteMark {
                id: 0,
                currency: currency.clone(),
                rate_type: rate_type.clone(),
                position: self.marks.len(),
            }),
        }
        self.marks = renumber(std::mem::take(&mut self.marks));
        self.state = ReorderState::Pending(snapshot);

        match store.toggle_favorite(&self.user, currency, rate_type) {
            Ok(answer) => {
                let guessed = existing.is_none();
                if guessed != answer.is_some() {
                    tracing::warn!(user = %self.user, %currency, %rate_type, added = answer.is_some(), "store disagreed with local favorites");
                }
                let mut marks = std::mem::take(&mut self.marks);
                marks.retain(|m| !(&m.currency == currency && &m.rate_type == rate_type));
                if let Some(mark) = &answer {
                    marks.push(mark.clone());
                }
                self.marks = renumber(marks);
                self.commit();
                Ok(answer.is_some())
            }
            Err(e) => {
                self.rollback();
                Err(into_persistence(e))
            }
        }
    }
}

fn into_persistence(e: FxError) -> FxError {
    match e {
        FxError::PersistenceFailure(_) => e,
        other => FxError::PersistenceFailure(other.to_string()),
    }
}

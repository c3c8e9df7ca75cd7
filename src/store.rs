//! In-memory record tables with a per-user index and an optional JSON snapshot.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::optimization::OptimizationRecord;
use crate::models::prediction::PredictionRecord;

pub trait Record: Clone {
    fn id(&self) -> Uuid;
    fn user_id(&self) -> Option<&str>;
}

impl Record for PredictionRecord {
    fn id(&self) -> Uuid { self.id }
    fn user_id(&self) -> Option<&str> { self.user_id.as_deref() }
}

impl Record for OptimizationRecord {
    fn id(&self) -> Uuid { self.id }
    fn user_id(&self) -> Option<&str> { self.user_id.as_deref() }
}

/// Rows keyed by insertion sequence, so iteration order is creation order.
#[derive(Debug, Clone)]
pub struct Table<T> {
    next_seq: u64,
    rows: BTreeMap<u64, T>,
    by_id: HashMap<Uuid, u64>,
    by_user: HashMap<String, BTreeSet<u64>>,
}

/// A record taken out of a table, with the position it held.
#[derive(Debug, Clone)]
pub struct Removed<T> {
    seq: u64,
    pub record: T,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { next_seq: 0, rows: BTreeMap::new(), by_id: HashMap::new(), by_user: HashMap::new() }
    }
}

impl<T: Record> Table<T> {
    pub fn insert(&mut self, record: T) -> Uuid {
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = record.id();
        if let Some(user) = record.user_id() {
            self.by_user.entry(user.to_string()).or_default().insert(seq);
        }
        self.by_id.insert(id, seq);
        self.rows.insert(seq, record);
        id
    }

    /// Newest first.
    pub fn by_user(&self, user_id: &str, limit: usize) -> Vec<T> {
        let Some(seqs) = self.by_user.get(user_id) else {
            return Vec::new();
        };
        seqs.iter()
            .rev()
            .take(limit)
            .filter_map(|seq| self.rows.get(seq).cloned())
            .collect()
    }

    /// Removes a record owned by `user_id`. Other users' records count as missing.
    pub fn delete_owned(&mut self, id: Uuid, user_id: &str) -> Result<Removed<T>, AppError> {
        let seq = *self.by_id.get(&id).ok_or(AppError::NotFound)?;
        let owned = self.rows.get(&seq).and_then(|r| r.user_id()) == Some(user_id);
        if !owned {
            return Err(AppError::NotFound);
        }
        self.remove_seq(seq).ok_or(AppError::NotFound)
    }

    /// Removes every record owned by `user_id`, oldest first.
    pub fn delete_all_owned(&mut self, user_id: &str) -> Vec<Removed<T>> {
        let seqs: Vec<u64> = self.by_user.get(user_id).map(|s| s.iter().copied().collect()).unwrap_or_default();
        seqs.into_iter().filter_map(|seq| self.remove_seq(seq)).collect()
    }

    /// Drops a record regardless of owner.
    pub fn remove(&mut self, id: Uuid) -> Option<Removed<T>> {
        let seq = *self.by_id.get(&id)?;
        self.remove_seq(seq)
    }

    /// Puts a removed record back at its original position.
    pub fn restore(&mut self, removed: Removed<T>) {
        let Removed { seq, record } = removed;
        if let Some(user) = record.user_id() {
            self.by_user.entry(user.to_string()).or_default().insert(seq);
        }
        self.by_id.insert(record.id(), seq);
        self.rows.insert(seq, record);
    }

    fn remove_seq(&mut self, seq: u64) -> Option<Removed<T>> {
        let record = self.rows.remove(&seq)?;
        self.by_id.remove(&record.id());
        if let Some(user) = record.user_id() {
            if let Some(seqs) = self.by_user.get_mut(user) {
                seqs.remove(&seq);
                if seqs.is_empty() {
                    self.by_user.remove(user);
                }
            }
        }
        Some(Removed { seq, record })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    pub fn from_rows(rows: impl IntoIterator<Item = T>) -> Self {
        let mut table = Self::default();
        for row in rows {
            table.insert(row);
        }
        table
    }
}

#[derive(Debug, Default)]
pub struct Store {
    pub predictions: Table<PredictionRecord>,
    pub optimizations: Table<OptimizationRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    predictions: Vec<PredictionRecord>,
    optimizations: Vec<OptimizationRecord>,
}

impl Store {
    pub fn to_snapshot_json(&self) -> Result<Vec<u8>, AppError> {
        let snapshot = Snapshot { predictions: self.predictions.rows(), optimizations: self.optimizations.rows() };
        Ok(serde_json::to_vec_pretty(&snapshot)?)
    }

    pub fn from_snapshot_json(bytes: &[u8]) -> Result<Self, AppError> {
        let snapshot: Snapshot = serde_json::from_slice(bytes)?;
        Ok(Self {
            predictions: Table::from_rows(snapshot.predictions),
            optimizations: Table::from_rows(snapshot.optimizations),
        })
    }

    /// Loads a snapshot, or starts empty when the file does not exist yet.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        match std::fs::read(path) {
            Ok(bytes) => Self::from_snapshot_json(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

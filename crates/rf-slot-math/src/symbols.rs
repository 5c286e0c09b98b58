//! Symbol definitions and the per-game symbol table

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

/// Symbol role on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Pays on lines
    Regular,
    /// Substitutes for regular symbols on lines
    Wild,
    /// Counts toward free-spin triggers anywhere on the board
    Scatter,
    /// Scatter that also escalates to the super bonus tier
    SuperScatter,
}

impl SymbolKind {
    pub fn is_scatter_class(self) -> bool {
        matches!(self, SymbolKind::Scatter | SymbolKind::SuperScatter)
    }
}

/// A symbol and its line pays
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    /// Compact id stored on strips and boards (index into the table)
    pub id: u32,
    /// Unique name, e.g. "H1"
    pub name: String,
    pub kind: SymbolKind,
    /// Line pay per run length (bet multiplier)
    pub pays: BTreeMap<u8, f64>,
}

impl Symbol {
    pub fn is_wild(&self) -> bool {
        self.kind == SymbolKind::Wild
    }

    pub fn is_scatter_class(&self) -> bool {
        self.kind.is_scatter_class()
    }

    /// Pay for a run of `count`, 0 when the run length has no entry
    pub fn pay(&self, count: u8) -> f64 {
        self.pays.get(&count).copied().unwrap_or(0.0)
    }

    /// Shortest paying run
    pub fn min_pay_count(&self) -> Option<u8> {
        self.pays.keys().next().copied()
    }
}

/// Immutable symbol lookup for one game
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    by_name: HashMap<String, u32>,
    wild: Option<u32>,
    scatter: u32,
    super_scatter: u32,
}

impl SymbolTable {
    /// Build a table from `(name, kind, pays)` definitions.
    ///
    /// Ids are assigned in definition order. The table must contain exactly
    /// one scatter and one super-scatter; at most one wild is allowed.
    pub fn new(defs: impl IntoIterator<Item = (String, SymbolKind, BTreeMap<u8, f64>)>) -> Result<Self> {
        let mut symbols = Vec::new();
        let mut by_name = HashMap::new();
        let mut wild = None;
        let mut scatter = None;
        let mut super_scatter = None;

        for (name, kind, pays) in defs {
            let id = symbols.len() as u32;
            if by_name.insert(name.clone(), id).is_some() {
                return Err(SlotError::DuplicateSymbol(name));
            }

            let slot = match kind {
                SymbolKind::Wild => Some(&mut wild),
                SymbolKind::Scatter => Some(&mut scatter),
                SymbolKind::SuperScatter => Some(&mut super_scatter),
                SymbolKind::Regular => None,
            };
            if let Some(slot) = slot {
                if slot.is_some() {
                    return Err(SlotError::Validation(format!(
                        "more than one {kind:?} symbol ('{name}')"
                    )));
                }
                *slot = Some(id);
            }

            symbols.push(Symbol { id, name, kind, pays });
        }

        let scatter = scatter.ok_or_else(|| SlotError::MissingSymbol("scatter".into()))?;
        let super_scatter =
            super_scatter.ok_or_else(|| SlotError::MissingSymbol("super_scatter".into()))?;

        Ok(Self {
            symbols,
            by_name,
            wild,
            scatter,
            super_scatter,
        })
    }

    /// Look up by id
    pub fn get(&self, id: u32) -> Option<&Symbol> {
        self.symbols.get(id as usize)
    }

    /// Look up by name
    pub fn by_name(&self, name: &str) -> Option<&Symbol> {
        self.by_name.get(name).and_then(|&id| self.get(id))
    }

    /// Resolve a name to its id, naming the referencing context on failure
    pub fn resolve(&self, name: &str, context: &str) -> Result<u32> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| SlotError::UnknownSymbol {
                symbol: name.to_string(),
                context: context.to_string(),
            })
    }

    /// Name for an id ("?" for ids outside the table)
    pub fn name(&self, id: u32) -> &str {
        self.get(id).map(|s| s.name.as_str()).unwrap_or("?")
    }

    pub fn wild(&self) -> Option<u32> {
        self.wild
    }

    pub fn scatter(&self) -> u32 {
        self.scatter
    }

    pub fn super_scatter(&self) -> u32 {
        self.super_scatter
    }

    pub fn is_wild(&self, id: u32) -> bool {
        self.wild == Some(id)
    }

    pub fn is_scatter_class(&self, id: u32) -> bool {
        id == self.scatter || id == self.super_scatter
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

use crate::catalog::LocationSource;
use crate::ids::LocationId;
use crate::model::{LocationEntry, MeasurementField, MeasurementRecord, MeasurementRow};

/// Row/column access to an editable grid of measurement text, independent
/// of how a host draws it.
pub trait CellGrid {
    fn row_count(&self) -> usize;
    fn read(&self, row: usize, field: MeasurementField) -> Option<&str>;
    fn write(&mut self, row: usize, field: MeasurementField, value: &str) -> Result<()>;
    fn for_each_row(&self, visitor: &mut dyn FnMut(usize, &MeasurementRow));
}

/// The rows currently shown to the operator. Seeded from a catalog entry,
/// then edited in place; edits never flow back into the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayTable {
    rows: Vec<MeasurementRow>,
    dirty: bool,
}

impl DisplayTable {
    /// Looks up `id` and reseeds from the result, or empties the table on a
    /// miss. Returns the entry so callers can show its name and AQI.
    pub fn select_location(
        &mut self,
        catalog: &dyn LocationSource,
        id: &LocationId,
    ) -> Option<LocationEntry> {
        match catalog.lookup(id) {
            Some(entry) => {
                self.reseed(&entry.records);
                Some(entry)
            }
            None => {
                self.reseed(&[]);
                None
            }
        }
    }

    /// Replaces every row. Unsaved edits are dropped.
    pub fn reseed(&mut self, records: &[MeasurementRecord]) {
        self.rows = records.iter().map(MeasurementRecord::to_row).collect();
        self.dirty = false;
    }

    pub fn edit_cell(
        &mut self,
        row: usize,
        field: MeasurementField,
        value: impl Into<String>,
    ) -> Result<()> {
        let row_count = self.rows.len();
        let Some(target) = self.rows.get_mut(row) else {
            bail!("row {row} is out of range; the table has {row_count} rows");
        };
        *target.field_mut(field) = value.into();
        self.dirty = true;
        Ok(())
    }

    pub fn snapshot(&self) -> Vec<MeasurementRow> {
        self.rows.clone()
    }

    pub fn rows(&self) -> &[MeasurementRow] {
        &self.rows
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl CellGrid for DisplayTable {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn read(&self, row: usize, field: MeasurementField) -> Option<&str> {
        self.rows.get(row).map(|cells| cells.get(field))
    }

    fn write(&mut self, row: usize, field: MeasurementField, value: &str) -> Result<()> {
        self.edit_cell(row, field, value)
    }

    fn for_each_row(&self, visitor: &mut dyn FnMut(usize, &MeasurementRow)) {
        for (index, row) in self.rows.iter().enumerate() {
            visitor(index, row);
        }
    }
}

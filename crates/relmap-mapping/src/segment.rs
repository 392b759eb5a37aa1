//! Recursive type-mapping segments.
//!
//! A [`Segment`] converts one value with its converter and then either emits
//! a column (terminal) or hands the converted value to a child segment
//! (composite). An optional sibling (`next`) processes the same original
//! value again, which is how one property spreads over several columns.
//!
//! The reverse walk consumes columns from a [`RowCursor`] in exactly the
//! order the forward walk emitted them.

use crate::builder::PropertyBuilder;
use crate::converter::Converter;
use relmap_core::error::MappingErrorKind;
use relmap_core::{Datum, Error, Result, Row, RowCursor, SqlType};
use std::sync::Arc;

/// One physical column emitted by a terminal segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub sql_type: SqlType,
    pub nullable: bool,
}

#[derive(Debug, Clone)]
pub enum SegmentBody {
    Terminal(ColumnDescriptor),
    Composite(Box<Segment>),
}

#[derive(Debug, Clone)]
pub struct Segment {
    converter: Arc<dyn Converter>,
    body: SegmentBody,
    next: Option<Box<Segment>>,
}

impl Segment {
    /// Build a segment from exactly one of `column` and `child`.
    pub fn new(
        converter: Arc<dyn Converter>,
        column: Option<ColumnDescriptor>,
        child: Option<Segment>,
    ) -> Result<Self> {
        let body = match (column, child) {
            (Some(column), None) => SegmentBody::Terminal(column),
            (None, Some(child)) => SegmentBody::Composite(Box::new(child)),
            (Some(column), Some(_)) => {
                return Err(Error::mapping(
                    MappingErrorKind::MalformedSegment,
                    format!(
                        "segment '{}' has both column {} and a child",
                        converter.name(),
                        column.name
                    ),
                ));
            }
            (None, None) => {
                return Err(Error::mapping(
                    MappingErrorKind::MalformedSegment,
                    format!("segment '{}' has neither a column nor a child", converter.name()),
                ));
            }
        };
        Ok(Self {
            converter,
            body,
            next: None,
        })
    }

    pub fn terminal(converter: Arc<dyn Converter>, column: ColumnDescriptor) -> Self {
        Self {
            converter,
            body: SegmentBody::Terminal(column),
            next: None,
        }
    }

    pub fn composite(converter: Arc<dyn Converter>, child: Segment) -> Self {
        Self {
            converter,
            body: SegmentBody::Composite(Box::new(child)),
            next: None,
        }
    }

    /// Link segments into a sibling chain, in order. `None` for an empty list.
    pub fn chain(segments: Vec<Segment>) -> Option<Segment> {
        let mut next: Option<Segment> = None;
        for mut segment in segments.into_iter().rev() {
            segment.next = next.map(Box::new);
            next = Some(segment);
        }
        next
    }

    pub fn converter(&self) -> &dyn Converter {
        self.converter.as_ref()
    }

    pub fn body(&self) -> &SegmentBody {
        &self.body
    }

    pub fn next(&self) -> Option<&Segment> {
        self.next.as_deref()
    }

    /// Number of segments in the sibling chain starting here.
    pub fn chain_len(&self) -> usize {
        1 + self.next.as_ref().map_or(0, |n| n.chain_len())
    }

    /// Columns in the order the forward walk emits them.
    pub fn columns(&self) -> Vec<&ColumnDescriptor> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a ColumnDescriptor>) {
        match &self.body {
            SegmentBody::Terminal(column) => out.push(column),
            SegmentBody::Composite(child) => child.collect_columns(out),
        }
        if let Some(next) = &self.next {
            next.collect_columns(out);
        }
    }

    /// Flatten `source` into columns appended to `row`.
    pub fn forward(&self, source: &Datum, row: &mut Row) -> Result<()> {
        let target = if source.is_null() {
            self.converter.null_mapping()
        } else {
            self.converter.to_target(source)?
        };
        match &self.body {
            SegmentBody::Terminal(column) => {
                let value = target.into_value()?;
                tracing::trace!(column = %column.name, converter = self.converter.name(), "emit column");
                row.push(column.name.clone(), Some(column.sql_type.clone()), value);
            }
            SegmentBody::Composite(child) => child.forward(&target, row)?,
        }
        if let Some(next) = &self.next {
            next.forward(source, row)?;
        }
        Ok(())
    }

    /// Rebuild one value from the columns at the cursor.
    pub fn reverse(&self, cursor: &mut RowCursor<'_>) -> Result<Datum> {
        if self.next.is_none() {
            let target = self.read_body(cursor)?;
            if target.is_null() {
                return Ok(Datum::NULL);
            }
            return self.converter.from_target(target);
        }

        let mut builder = PropertyBuilder::new(self.chain_len());
        let mut current = Some(self);
        while let Some(segment) = current {
            let target = segment.read_body(cursor)?;
            segment.converter.contribute(&mut builder, target)?;
            current = segment.next.as_deref();
        }
        builder.finish()
    }

    fn read_body(&self, cursor: &mut RowCursor<'_>) -> Result<Datum> {
        match &self.body {
            SegmentBody::Terminal(column) => Ok(Datum::Scalar(cursor.take(&column.name)?.clone())),
            SegmentBody::Composite(child) => child.reverse(cursor),
        }
    }
}

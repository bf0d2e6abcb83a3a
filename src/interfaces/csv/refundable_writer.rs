use crate::application::refund::RefundableLineItem;
use crate::error::Result;
use std::io::Write;

pub const HEADER: [&str; 6] = [
    "unique_id",
    "name",
    "quantity",
    "refundable_quantity",
    "unit_price",
    "refundable_amount",
];

/// Writes the refundable report of a transaction as CSV.
pub struct RefundableWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> RefundableWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new().from_writer(sink),
        }
    }

    /// Writes the header and one row per line item, then flushes.
    ///
    /// Amounts are written normalized (`40`, `12.5`).
    pub fn write_line_items<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = RefundableLineItem>,
    {
        self.writer.write_record(HEADER)?;
        for item in items {
            self.writer.write_record([
                item.unique_id,
                item.name,
                item.quantity.to_string(),
                item.refundable_quantity.to_string(),
                item.unit_price_including_tax.normalize().to_string(),
                item.refundable_amount.normalize().to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_writes_header_and_rows() {
        let mut out = Vec::new();
        RefundableWriter::new(&mut out)
            .write_line_items([
                RefundableLineItem {
                    unique_id: "li-1".into(),
                    name: "Hat, wool".into(),
                    quantity: 3,
                    refundable_quantity: 2,
                    unit_price_including_tax: dec!(12.50),
                    refundable_amount: dec!(25.00),
                },
                RefundableLineItem {
                    unique_id: "li-2".into(),
                    name: "Shipping".into(),
                    quantity: 1,
                    refundable_quantity: 0,
                    unit_price_including_tax: dec!(4.9),
                    refundable_amount: dec!(0),
                },
            ])
            .unwrap();

        let output = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "unique_id,name,quantity,refundable_quantity,unit_price,refundable_amount");
        assert_eq!(lines[1], "li-1,\"Hat, wool\",3,2,12.5,25");
        assert_eq!(lines[2], "li-2,Shipping,1,0,4.9,0");
    }
}

//! Stock checks and decrements for a single line.
//!
//! These functions are pure: they take the SKU state read inside the
//! transaction and return the state to write back. Persistence is the
//! transactor's job.

use inventory_store::{SaleMode, Sku};

use crate::error::StockConflict;

/// The outcome of reserving one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    /// SKU with its stock fields already decremented.
    pub updated: Sku,
    /// Grams leaving stock. For pieces, the piece's full weight.
    pub grams: i64,
}

/// Checks that `requested_grams` of `sku` can be sold and returns the
/// decremented state.
///
/// Pieces sell whole: they must not be sold out and become sold out.
/// Bulk stock must cover the request; `in_stock` is recomputed from the
/// remaining grams.
pub fn reserve(sku: &Sku, requested_grams: i64) -> Result<Reservation, StockConflict> {
    match sku.sale_mode {
        SaleMode::PieceByWeight => {
            if sku.sold_out {
                return Err(StockConflict::AlreadySold {
                    sku_code: sku.code.clone(),
                });
            }
            if !sku.in_stock {
                return Err(StockConflict::OutOfStock {
                    sku_code: sku.code.clone(),
                });
            }

            Ok(Reservation {
                updated: Sku {
                    sold_out: true,
                    in_stock: false,
                    ..sku.clone()
                },
                grams: sku.weight_grams.unwrap_or(requested_grams),
            })
        }
        SaleMode::BulkGrams => {
            if !sku.in_stock {
                return Err(StockConflict::OutOfStock {
                    sku_code: sku.code.clone(),
                });
            }
            if sku.available_grams < requested_grams {
                return Err(StockConflict::InsufficientGrams {
                    sku_code: sku.code.clone(),
                    available: sku.available_grams,
                    requested: requested_grams,
                });
            }

            let remaining = sku.available_grams - requested_grams;
            Ok(Reservation {
                updated: Sku {
                    available_grams: remaining,
                    in_stock: remaining > 0,
                    ..sku.clone()
                },
                grams: requested_grams,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use inventory_store::{Money, NewSku};

    fn bulk(grams: i64) -> Sku {
        NewSku::bulk("X", "Bulk", grams, Money::from_minor(100)).into_sku(Utc::now())
    }

    fn piece() -> Sku {
        NewSku::piece("Y", "Piece", 120, Money::from_minor(100)).into_sku(Utc::now())
    }

    #[test]
    fn bulk_reservation_decrements_and_keeps_in_stock() {
        let reservation = reserve(&bulk(100), 80).unwrap();
        assert_eq!(reservation.grams, 80);
        assert_eq!(reservation.updated.available_grams, 20);
        assert!(reservation.updated.in_stock);
        assert!(reservation.updated.is_consistent());
    }

    #[test]
    fn bulk_reservation_of_everything_clears_in_stock() {
        let reservation = reserve(&bulk(50), 50).unwrap();
        assert_eq!(reservation.updated.available_grams, 0);
        assert!(!reservation.updated.in_stock);
        assert!(reservation.updated.is_consistent());
    }

    #[test]
    fn bulk_shortfall_reports_available_and_requested() {
        let err = reserve(&bulk(20), 50).unwrap_err();
        assert_eq!(
            err,
            StockConflict::InsufficientGrams {
                sku_code: "X".to_string(),
                available: 20,
                requested: 50,
            }
        );
        assert!(err.to_string().contains("only 20g available"));
    }

    #[test]
    fn empty_bulk_is_out_of_stock() {
        let err = reserve(&bulk(0), 1).unwrap_err();
        assert!(matches!(err, StockConflict::OutOfStock { .. }));
    }

    #[test]
    fn piece_reservation_marks_sold_out_for_full_weight() {
        let reservation = reserve(&piece(), 1).unwrap();
        assert!(reservation.updated.sold_out);
        assert!(!reservation.updated.in_stock);
        assert_eq!(reservation.grams, 120);
        assert!(reservation.updated.is_consistent());
    }

    #[test]
    fn piece_can_only_be_reserved_once() {
        let sold = reserve(&piece(), 120).unwrap().updated;
        let err = reserve(&sold, 120).unwrap_err();
        assert_eq!(
            err,
            StockConflict::AlreadySold {
                sku_code: "Y".to_string()
            }
        );
    }

    #[test]
    fn piece_hidden_from_sale_is_out_of_stock() {
        let hidden = Sku {
            in_stock: false,
            ..piece()
        };
        assert!(matches!(
            reserve(&hidden, 120),
            Err(StockConflict::OutOfStock { .. })
        ));
    }
}

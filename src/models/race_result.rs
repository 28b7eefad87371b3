use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{
    error::BoxDynError,
    postgres::{PgTypeInfo, PgValueRef, Postgres},
    Decode, FromRow, Type, ValueRef,
};

/// One (race, driver, result) tuple from the results join.
#[derive(FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct RaceResult {
    pub race_year: i32,
    pub race_date: NaiveDate,
    pub circuit_country: String,
    #[sqlx(try_from = "Coordinate")]
    pub circuit_lat: f64,
    #[sqlx(try_from = "Coordinate")]
    pub circuit_lng: f64,
    pub driver_id: i32,
    pub position_order: i32,
    pub points: Decimal,
}

impl RaceResult {
    pub fn points_f64(&self) -> f64 {
        self.points.to_f64().unwrap_or(0.0)
    }
}

/// Latitude or longitude stored as `real`, `double precision` or `numeric`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate(pub f64);

impl From<Coordinate> for f64 {
    fn from(coordinate: Coordinate) -> Self {
        coordinate.0
    }
}

impl Type<Postgres> for Coordinate {
    fn type_info() -> PgTypeInfo {
        <f64 as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <f64 as Type<Postgres>>::compatible(ty)
            || <f32 as Type<Postgres>>::compatible(ty)
            || <Decimal as Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for Coordinate {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let ty = value.type_info().into_owned();
        if <f32 as Type<Postgres>>::compatible(&ty) {
            let v = <f32 as Decode<Postgres>>::decode(value)?;
            Ok(Coordinate(v as f64))
        } else if <Decimal as Type<Postgres>>::compatible(&ty) {
            let v = <Decimal as Decode<Postgres>>::decode(value)?;
            v.to_f64()
                .map(Coordinate)
                .ok_or_else(|| format!("coordinate {v} out of range").into())
        } else {
            Ok(Coordinate(<f64 as Decode<Postgres>>::decode(value)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_accepts_float_and_numeric_columns() {
        assert!(<Coordinate as Type<Postgres>>::compatible(
            &<f64 as Type<Postgres>>::type_info()
        ));
        assert!(<Coordinate as Type<Postgres>>::compatible(
            &<f32 as Type<Postgres>>::type_info()
        ));
        assert!(<Coordinate as Type<Postgres>>::compatible(
            &<Decimal as Type<Postgres>>::type_info()
        ));
        assert!(!<Coordinate as Type<Postgres>>::compatible(
            &<String as Type<Postgres>>::type_info()
        ));
    }

    #[test]
    fn coordinate_converts_to_degrees() {
        assert_eq!(f64::from(Coordinate(-33.8688)), -33.8688);
    }
}

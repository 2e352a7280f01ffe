//! Service record panel: details, mileage, price, date and time

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use servis_api::{Fields, Value};

use crate::core::timestamp::{
    self, COMBINED_FIELD, DATE_FIELD, STORED_DATE_FORMAT, STORED_TIME_FORMAT, TIME_FIELD,
};
use crate::error::{Result, ServisError};

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceForm {
    pub details: String,
    pub mileage: String,
    pub price: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl ServiceForm {
    /// Empty form dated `now`
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            details: String::new(),
            mileage: String::new(),
            price: String::new(),
            date: now.date(),
            time: now.time(),
        }
    }

    pub fn clear(&mut self, now: NaiveDateTime) {
        *self = Self::new(now);
    }

    /// Fill the form from a service document.
    ///
    /// The combined `datum_vreme` field takes precedence over the separate
    /// date and time fields; date or time that cannot be read keep their
    /// current value.
    pub fn load(&mut self, fields: &Fields) -> Result<()> {
        let text = |field: &str| fields.get(field).map(Value::display_text).unwrap_or_default();
        self.details = text("detalji");
        self.mileage = text("kilometraza");
        self.price = text("cena");

        match fields.get(COMBINED_FIELD).filter(|v| !v.is_null()) {
            Some(combined) => {
                let (date, time) = timestamp::split_timestamp(&combined.display_text())?;
                self.date = date;
                self.time = time;
            }
            None => {
                if let Ok(date) = NaiveDate::parse_from_str(&text(DATE_FIELD), STORED_DATE_FORMAT) {
                    self.date = date;
                }
                if let Ok(time) = NaiveTime::parse_from_str(&text(TIME_FIELD), STORED_TIME_FORMAT) {
                    self.time = time;
                }
            }
        }
        Ok(())
    }

    /// Field mapping of a service record; mileage and price are coerced here.
    ///
    /// Empty mileage and price become 0 and 0.0.
    pub fn to_fields(&self) -> Result<Fields> {
        let mileage = match self.mileage.trim() {
            "" => 0,
            raw => raw.parse::<i64>().map_err(|_| ServisError::InvalidNumber {
                field: "kilometraza",
                value: self.mileage.clone(),
            })?,
        };
        let price = match self.price.trim() {
            "" => 0.0,
            raw => raw.parse::<f64>().map_err(|_| ServisError::InvalidNumber {
                field: "cena",
                value: self.price.clone(),
            })?,
        };

        Ok(Fields::from([
            ("detalji".to_string(), Value::from(self.details.as_str())),
            ("kilometraza".to_string(), Value::Integer(mileage)),
            ("cena".to_string(), Value::Float(price)),
            (
                DATE_FIELD.to_string(),
                Value::String(timestamp::format_stored_date(self.date)),
            ),
            (
                TIME_FIELD.to_string(),
                Value::String(timestamp::format_stored_time(self.time)),
            ),
        ]))
    }

    /// Fields of a new service record belonging to `vehicle_id`
    pub fn to_new_record(&self, vehicle_id: &str) -> Result<Fields> {
        let mut fields = self.to_fields()?;
        fields.insert("pripada".to_string(), Value::from(vehicle_id));
        Ok(fields)
    }
}

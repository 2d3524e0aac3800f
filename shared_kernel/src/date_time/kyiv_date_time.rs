use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Europe::Kyiv;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
/// KyivTZDateTime stores the time as `DateTime<UTC>` for easier serialization
/// and deserialization
pub struct KyivTZDateTime(DateTime<Utc>);

impl KyivTZDateTime {
    pub fn now() -> Self {
        KyivTZDateTime(Utc::now())
    }

    /// Calendar date in the Kyiv timezone.
    pub fn date(&self) -> NaiveDate {
        self.naive_local().date()
    }

    /// Wall-clock date and time in the Kyiv timezone.
    pub fn naive_local(&self) -> NaiveDateTime {
        self.to_date_time().naive_local()
    }

    pub fn to_date_time(&self) -> DateTime<Tz> {
        Kyiv.from_utc_datetime(&self.0.naive_utc())
    }
}

impl From<DateTime<Utc>> for KyivTZDateTime {
    fn from(data: DateTime<Utc>) -> KyivTZDateTime {
        KyivTZDateTime(data)
    }
}

impl TryFrom<NaiveDateTime> for KyivTZDateTime {
    type Error = String;

    fn try_from(value: NaiveDateTime) -> Result<Self, Self::Error> {
        Kyiv.from_local_datetime(&value)
            .single()
            .ok_or_else(|| format!("Failed to convert {value} to Kyiv timezone"))
            .map(|date_time| {
                let date_time = date_time.naive_utc();
                let date_time = Utc.from_utc_datetime(&date_time);
                Self(date_time)
            })
    }
}

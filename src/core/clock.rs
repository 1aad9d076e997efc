use crate::core::Clock;
use crate::utils::error::{ForecastError, Result};
use chrono::{
    DateTime, Days, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;

/// API 回傳的 `start_date` 格式 (不含時區位移)
pub const START_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// 在 `tz` 時區觀察到的「明天」
pub fn tomorrow_in(clock: &dyn Clock, tz: Tz) -> NaiveDate {
    clock.now().with_timezone(&tz).date_naive() + Days::new(1)
}

/// 把來源時區的本地時間字串轉成顯示時區的時間
pub fn to_display_time(start_date: &str, source: Tz, display: Tz) -> Result<DateTime<Tz>> {
    let naive = NaiveDateTime::parse_from_str(start_date, START_DATE_FORMAT).map_err(|source| {
        ForecastError::TimestampError {
            value: start_date.to_string(),
            source,
        }
    })?;

    Ok(localize(naive, source).with_timezone(&display))
}

fn localize(naive: NaiveDateTime, tz: Tz) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        // 重複的時段 (夏令時間結束) 取標準時間
        LocalResult::Ambiguous(_, standard) => standard,
        // 不存在的時段 (夏令時間開始) 沿用切換前的位移
        LocalResult::None => {
            let before = tz
                .offset_from_utc_datetime(&(naive - TimeDelta::days(1)))
                .fix()
                .local_minus_utc();
            let utc = naive - TimeDelta::seconds(i64::from(before));
            Utc.from_utc_datetime(&utc).with_timezone(&tz)
        }
    }
}

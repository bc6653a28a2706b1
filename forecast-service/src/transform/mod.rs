use time::macros::datetime;
use usage_domain::UsageRecord;

use crate::sources::usage_csv_file::RowError;

/// Pure validation of a loaded `UsageRecord`.
///
/// Rules:
/// - ts must be within a broad sanity window [2000-01-01, 2100-01-01].
///
/// Non-negative usage is already enforced when the record is built.
pub fn validate_usage_record(record: &UsageRecord) -> Result<(), RowError> {
    let min_ts = datetime!(2000-01-01 00:00:00);
    let max_ts = datetime!(2100-01-01 00:00:00);

    if record.ts() < min_ts || record.ts() > max_ts {
        return Err(RowError::Rejected("timestamp out of allowed range".to_string()));
    }

    Ok(())
}

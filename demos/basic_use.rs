use arso::{Arso, ArsoError};
use chrono::NaiveDate;

#[tokio::main]
async fn main() -> Result<(), ArsoError> {
    let client = Arso::new().await?;

    let date = NaiveDate::from_ymd_opt(2012, 11, 11).unwrap();
    let flags = client
        .get_data_daily()
        .date(date)
        .features(&["sneg", "toca", "padavinski_dan"])
        .call()
        .await?;
    println!("daily flags for {date}: {flags:?}");

    let values = client
        .get_data_hhour()
        .datetime(date.and_hms_opt(12, 30, 0).unwrap())
        .features(&["t2m", "veter_hitrost"])
        .cache_files(true)
        .call()
        .await?;
    println!("half-hourly values at 12:30: {values:?}");

    Ok(())
}

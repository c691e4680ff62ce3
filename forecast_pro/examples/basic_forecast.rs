use chrono::{Months, NaiveDate};
use forecast_pro::data::TimeSeries;
use forecast_pro::forecast::ForecastEngine;
use forecast_pro::frequency::Frequency;
use forecast_pro::models::arima::{ArimaModel, ArimaOrder, ArimaParams};
use forecast_pro::models::{ForecastModel, TrainedForecastModel};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Forecast Pro: Basic Forecasting Example");
    println!("=======================================\n");

    // Simulate five years of monthly data from a known process
    let truth = ArimaParams {
        intercept: 0.4,
        ar: vec![0.5],
        ma: vec![0.3],
    };
    let mut rng = StdRng::seed_from_u64(7);
    let values = truth.simulate(1, 60, 1.0, 100.0, &mut rng)?;

    let start = NaiveDate::from_ymd_opt(2019, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or("invalid start date")?;
    let timestamps = (0..values.len() as u32)
        .map(|i| start.checked_add_months(Months::new(i)).ok_or("date overflow"))
        .collect::<Result<Vec<_>, _>>()?;
    let series = TimeSeries::new(timestamps, values)?;
    println!("Sample data created: {} monthly points\n", series.len());

    // Fit the model directly
    let model = ArimaModel::new(ArimaOrder::new(1, 1, 1));
    let trained = model.train(series.values())?;
    println!("{}\n", trained);
    println!("True parameters: {:?}\n", truth);

    let raw = trained.forecast(5)?;
    println!("Point forecasts: {:?}", raw.values());
    println!("Standard errors: {:?}\n", raw.std_errors());

    // Or let the engine date the forecasts
    let frequency = Frequency::resolve(series.timestamps(), true)?.frequency;
    let forecast = ForecastEngine::new().predict(&trained, &series, frequency, 5)?;
    println!("Forecast with 95% intervals ({}):", frequency);
    for entry in forecast.entries() {
        println!(
            "  {}: {:.2} ({:.2}, {:.2})",
            entry.timestamp.date(),
            entry.mean,
            entry.lower,
            entry.upper
        );
    }

    Ok(())
}

use forecast_pro::config::ForecastConfig;
use forecast_pro::data::DataLoader;
use forecast_pro::pipeline::ForecastPipeline;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/examples/csv/leisure.csv");
    let table = DataLoader::from_csv(path)?;

    let pipeline = ForecastPipeline::new(ForecastConfig::new().with_steps(3))?;
    let report = pipeline.run_table(&table)?;

    print!("{}", report);
    Ok(())
}

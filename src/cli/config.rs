use crate::error::Result;
use crate::settings::{load_settings, save_settings};

pub fn run(guided: Option<bool>, forecast_days: Option<u32>) -> Result<()> {
    let mut settings = load_settings();

    if guided.is_none() && forecast_days.is_none() {
        println!("data_dir:      {}", settings.data_dir);
        println!("guided_mode:   {}", settings.guided_mode);
        println!("forecast_days: {}", settings.forecast_days);
        return Ok(());
    }

    if let Some(g) = guided {
        settings.guided_mode = g;
        println!("Guided mode {}.", if g { "enabled" } else { "disabled" });
    }
    if let Some(d) = forecast_days {
        settings.forecast_days = d;
        println!("Forecast horizon set to {d} days.");
    }
    save_settings(&settings)
}

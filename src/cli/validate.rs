use anyhow::Result;
use log::info;
use std::path::PathBuf;

/// Validate the experiments named in a list file
pub fn run(list: PathBuf) -> Result<()> {
    use peakalign::experiment::read_experiment_list;
    use peakalign::validator::validate_experiments;

    info!("Peak List Validator");
    info!("===================");
    info!("List: {}", list.display());
    info!("");

    match read_experiment_list(&list) {
        Ok(experiments) => {
            let mut report = validate_experiments(&experiments);
            report.source = list.display().to_string();

            // Use colorized output if available
            #[cfg(feature = "colorized_output")]
            {
                println!("{}", report.format_colored());
            }

            #[cfg(not(feature = "colorized_output"))]
            {
                println!("{}", report);
            }

            // Exit with error code if validation failed
            if report.has_failures() {
                std::process::exit(1);
            }

            Ok(())
        }
        Err(e) => {
            eprintln!("Validation error: {}", e);
            std::process::exit(1);
        }
    }
}

//! Facility and zone listings.

use parkwatch_core::models::{Facility, Zone};
use parkwatch_core::{FacilityLookup, Monitor};
use tabled::Tabled;

use crate::cli::{FacilitiesArgs, FacilitiesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct FacilityRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Zones")]
    zones: String,
}

impl From<&Facility> for FacilityRow {
    fn from(f: &Facility) -> Self {
        let zones = f
            .zones_count
            .or_else(|| f.zones.as_ref().map(|z| z.len() as u64))
            .map_or_else(|| "-".into(), |n| n.to_string());
        Self {
            id: f.id,
            name: f.name.clone(),
            zones,
        }
    }
}

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Daily Capacity")]
    capacity: String,
}

impl From<&Zone> for ZoneRow {
    fn from(z: &Zone) -> Self {
        Self {
            id: z.id,
            name: z.name.clone(),
            capacity: z
                .daily_capacity
                .map_or_else(|| "-".into(), |c| c.to_string()),
        }
    }
}

pub async fn handle(monitor: &Monitor, args: FacilitiesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        FacilitiesCommand::List => {
            let facilities = monitor.facilities().await?;
            let out = output::render_list(
                global.output,
                &facilities,
                |f| FacilityRow::from(f),
                |f| f.id.to_string(),
            );
            output::print_output(&out, global.quiet);
        }
        FacilitiesCommand::Zones { facility } => {
            let mut lookup = FacilityLookup::new(monitor.client().clone());
            lookup.load().await;
            if let Some(message) = lookup.facilities_error() {
                return Err(CliError::Api {
                    message: message.to_owned(),
                    status: None,
                });
            }
            if lookup.facility(facility).is_none() {
                return Err(CliError::NotFound {
                    what: format!("facility {facility} (run: parkwatch facilities list)"),
                });
            }

            let zones = lookup.select_facility(Some(facility)).await.to_vec();
            if let Some(message) = lookup.zones_error() {
                return Err(CliError::Api {
                    message: message.to_owned(),
                    status: None,
                });
            }
            let out = output::render_list(global.output, &zones, |z| ZoneRow::from(z), |z| z.id.to_string());
            output::print_output(&out, global.quiet);
        }
    }
    Ok(())
}

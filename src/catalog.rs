//! Built-in reference catalog of real orderable parts, served when every
//! live source comes back empty. The table is immutable at runtime.

use std::sync::OnceLock;

use regex::Regex;

use crate::constants::sources;
use crate::models::{Availability, ComponentRecord, LifecycleStatus, Pricing};

#[derive(Debug, Clone, Copy)]
pub struct ReferencePart {
    pub part_number: &'static str,
    pub manufacturer: &'static str,
    pub description: &'static str,
    pub unit_price: f64,
}

const fn part(
    part_number: &'static str,
    manufacturer: &'static str,
    description: &'static str,
    unit_price: f64,
) -> ReferencePart {
    ReferencePart {
        part_number,
        manufacturer,
        description,
        unit_price,
    }
}

const PROCESSORS: &[ReferencePart] = &[
    part("STM32F407VGT6", "STMicroelectronics", "ARM Cortex-M4 MCU, 168MHz, 1MB Flash, 192KB RAM, LQFP-100", 12.50),
    part("XC7A35T-1CSG324C", "AMD/Xilinx", "Artix-7 FPGA, 33K Logic Cells, 324-BGA", 45.00),
    part("XC7A100T-2FGG484I", "AMD/Xilinx", "Artix-7 FPGA, 101K Logic Cells, 484-FBGA", 85.00),
    part("LFE5U-25F-6BG256C", "Lattice", "ECP5 FPGA, 24K LUTs, 256-caBGA", 12.00),
    part("ATSAMD51J19A-AU", "Microchip", "ARM Cortex-M4F MCU, 120MHz, 512KB Flash", 6.20),
    part("ESP32-S3-WROOM-1-N16R8", "Espressif", "Wi-Fi+BLE SoC Module, Dual-Core 240MHz", 3.10),
];

const POWER_REGULATORS: &[ReferencePart] = &[
    part("TPS65263RHBR", "Texas Instruments", "Triple Output Buck Converter, 3x 3A, QFN-40", 4.50),
    part("LMR36015ADDAR", "Texas Instruments", "SIMPLE SWITCHER Buck, 36V In, 1.5A", 2.80),
    part("TPS63001DRCR", "Texas Instruments", "Buck-Boost Converter, 96% Eff, 1.8A, SOT-23", 3.20),
    part("AP2112K-3.3TRG1", "Diodes Inc", "600mA LDO Regulator, 3.3V Fixed, SOT-25", 0.35),
    part("TPS54360DDAR", "Texas Instruments", "60V Input, 3.5A Step-Down Converter", 3.50),
    part("LM2596S-5.0/NOPB", "Texas Instruments", "3A Step-Down Regulator, 5V Fixed Output", 2.50),
];

const AMPLIFIERS: &[ReferencePart] = &[
    part("TGF2965-SM", "Qorvo", "GaN HEMT, DC-18GHz, 10W, 28V, 65% PAE", 85.00),
    part("TGA2594-SM", "Qorvo", "GaN PA, 2-18GHz, 4W, 22dB Gain", 120.00),
    part("HMC580ALC3B", "Analog Devices", "GaAs pHEMT Driver Amp, DC-6GHz, 13dB Gain", 12.00),
    part("HMC1131", "Analog Devices", "GaAs pHEMT Driver, 6-18GHz, 21dB Gain, 1W", 45.00),
    part("SKY67159-396LF", "Skyworks", "Wideband LNA, 0.7-3.8GHz, 20dB Gain, 0.6dB NF", 2.80),
    part("CMPA0060025D", "Wolfspeed", "GaN HEMT, DC-6GHz, 25W, 28V", 95.00),
];

const RF_COMPONENTS: &[ReferencePart] = &[
    part("ADL5801ACPZ", "Analog Devices", "Wideband Active Mixer, 10MHz-6GHz, 0.4dB NF", 15.00),
    part("HMC558ALC3B", "Analog Devices", "Double-Balanced Mixer, 5.5-14GHz", 18.00),
    part("BFCN-5500+", "Mini-Circuits", "Bandpass Filter, 4.9-6.2GHz, LTCC", 3.50),
    part("QCN-19D+", "Mini-Circuits", "Directional Coupler, 5-20GHz, 20dB Coupling", 6.50),
    part("TQL9065", "Qorvo", "Ultra-Low Noise LNA, 5-18GHz, 1.2dB NF, 18dB Gain", 12.00),
];

const INTERFACES: &[ReferencePart] = &[
    part("AD9744ARUZ", "Analog Devices", "14-bit DAC, 210 MSPS, TSSOP-28", 18.00),
    part("AD9235BRUZ-65", "Analog Devices", "12-bit ADC, 65 MSPS, TSSOP-28", 12.50),
    part("FT232RL-REEL", "FTDI", "USB to UART IC, Full Speed, SSOP-28", 4.50),
    part("SN65HVD230DR", "Texas Instruments", "3.3V CAN Bus Transceiver, SOIC-8", 1.20),
    part("MAX3232ECPE+", "Analog Devices", "RS-232 Transceiver, 3.0V-5.5V, DIP-16", 2.80),
];

const OSCILLATORS: &[ReferencePart] = &[
    part("ASTX-H11-100.000MHZ-T", "Abracon", "TCXO, 100MHz, 2.5ppm, 3.3V, SMD", 5.50),
    part("SIT8008BI-82-33E-100.000000G", "SiTime", "MEMS Oscillator, 100MHz, 3.3V, 25ppm", 2.25),
];

const CONNECTORS: &[ReferencePart] = &[
    part("132322-11", "Amphenol", "SMA Connector, Female, PCB Mount, 50 Ohm, 18GHz", 2.50),
    part("901-10511-2", "Amphenol", "SMA Connector, Male, Edge-Mount, 18GHz", 3.80),
    part("10118192-0001LF", "Amphenol", "USB Micro-B Receptacle, SMD, Right Angle", 0.45),
];

const POWER_INPUTS: &[ReferencePart] = &[
    part("KPPX-3P", "Kycon", "DC Power Jack, 2.5mm Center Pin, Panel Mount", 1.20),
    part("PJ-037A", "CUI Devices", "DC Barrel Jack, 2.1mm, SMD Right Angle", 0.85),
];

pub const CATEGORIES: &[(&str, &[ReferencePart])] = &[
    ("processor", PROCESSORS),
    ("power_regulator", POWER_REGULATORS),
    ("amplifier", AMPLIFIERS),
    ("rf_component", RF_COMPONENTS),
    ("interface", INTERFACES),
    ("oscillator", OSCILLATORS),
    ("connector", CONNECTORS),
    ("power_input", POWER_INPUTS),
];

fn parts_for(category: &str) -> Option<&'static [ReferencePart]> {
    CATEGORIES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, parts)| *parts)
}

fn normalize_category(category: &str) -> String {
    category.trim().to_lowercase().replace(' ', "_")
}

/// Leading letters-then-digits prefix of a part number, lowercased:
/// "STM32F407VGT6" -> "stm32". Falls back to the whole string without
/// separators when the part number has no such prefix ("132322-11").
fn base_part_number(part_number: &str) -> String {
    static BASE: OnceLock<Regex> = OnceLock::new();
    let re = BASE.get_or_init(|| Regex::new(r"^[A-Za-z]+\d+").expect("Invalid regex"));

    re.find(part_number).map_or_else(
        || part_number.to_lowercase().replace(['-', ' '], ""),
        |m| m.as_str().to_lowercase(),
    )
}

fn to_record(entry: &ReferencePart, category: &str) -> ComponentRecord {
    ComponentRecord {
        part_number: entry.part_number.to_string(),
        manufacturer: entry.manufacturer.to_string(),
        description: entry.description.to_string(),
        category: category.to_string(),
        datasheet_url: None,
        product_url: None,
        specifications: std::collections::HashMap::new(),
        pricing: Pricing {
            unit_price: format!("${:.2}", entry.unit_price),
            min_qty: 1,
            price_breaks: Vec::new(),
        },
        availability: Availability {
            stock: 500,
            lead_time: Some("2-4 weeks".to_string()),
        },
        lifecycle_status: LifecycleStatus::Active,
        source: sources::DEMO.to_string(),
    }
}

/// Catalog lookup for the fallback path. Matches the search term against
/// part number bases and descriptions, trying the requested category
/// first and then every other one. When nothing matches, serves all parts
/// of the requested category, or nothing if the category is unknown.
#[must_use]
pub fn fallback_components(search_term: &str, category: &str) -> Vec<ComponentRecord> {
    let keyword = search_term.trim().to_lowercase();
    let keyword_base = base_part_number(&keyword);
    let requested = normalize_category(category);

    let mut ordered: Vec<&str> = Vec::with_capacity(CATEGORIES.len());
    ordered.push(requested.as_str());
    for (name, _) in CATEGORIES {
        if *name != requested {
            ordered.push(name);
        }
    }

    let mut matched = Vec::new();
    for cat in ordered {
        let Some(parts) = parts_for(cat) else {
            continue;
        };
        for entry in parts {
            let part_base = base_part_number(entry.part_number);
            let base_hit = !keyword_base.is_empty()
                && (part_base.contains(&keyword_base) || keyword_base.contains(&part_base));
            let text_hit = entry.part_number.to_lowercase().contains(&keyword)
                || entry.description.to_lowercase().contains(&keyword);
            if base_hit || text_hit {
                matched.push(to_record(entry, cat));
            }
        }
    }

    if matched.is_empty()
        && let Some(parts) = parts_for(&requested)
    {
        matched.extend(parts.iter().map(|entry| to_record(entry, &requested)));
    }

    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_part_number_extracts_letter_digit_prefix() {
        assert_eq!(base_part_number("STM32F407VGT6"), "stm32");
        assert_eq!(base_part_number("TPS65263RHBR"), "tps65263");
        assert_eq!(base_part_number("132322-11"), "13232211");
    }

    #[test]
    fn part_number_prefix_matches_family() {
        let records = fallback_components("STM32F4", "processor");
        assert!(records.iter().any(|r| r.part_number == "STM32F407VGT6"));
        for record in &records {
            assert_eq!(record.source, "demo");
            assert_eq!(record.lifecycle_status, LifecycleStatus::Active);
        }
    }

    #[test]
    fn description_words_match_across_categories() {
        // "FPGA" appears only in processor descriptions, found even when
        // the caller asks for a different category.
        let records = fallback_components("FPGA", "amplifier");
        assert!(!records.is_empty());
        assert!(records.iter().all(|r| r.category == "processor"));
    }

    #[test]
    fn unmatched_term_serves_whole_requested_category() {
        let records = fallback_components("zzz-no-such-part", "oscillator");
        assert_eq!(records.len(), OSCILLATORS.len());
        assert!(records.iter().all(|r| r.category == "oscillator"));
    }

    #[test]
    fn unknown_category_with_no_match_yields_nothing() {
        let records = fallback_components("zzz-no-such-part", "widget");
        assert!(records.is_empty());
    }

    #[test]
    fn category_names_are_spelled_with_underscores() {
        let records = fallback_components("zzz-no-such-part", "Power Regulator");
        assert_eq!(records.len(), POWER_REGULATORS.len());
        assert!(records.iter().all(|r| r.category == "power_regulator"));
    }

    #[test]
    fn demo_records_carry_uniform_stock_and_pricing_shape() {
        let records = fallback_components("STM32F407VGT6", "processor");
        let record = records
            .iter()
            .find(|r| r.part_number == "STM32F407VGT6")
            .unwrap();
        assert_eq!(record.pricing.unit_price, "$12.50");
        assert_eq!(record.pricing.min_qty, 1);
        assert_eq!(record.availability.stock, 500);
        assert_eq!(record.availability.lead_time.as_deref(), Some("2-4 weeks"));
    }
}

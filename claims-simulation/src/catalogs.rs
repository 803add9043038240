use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{SimulationError, SimulationResult};

/// Catalog entry carrying a relative weight
pub trait Weighted {
    fn weight(&self) -> f64;
}

/// Payer rule whose violation pushes a claim towards denial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayerRule {
    pub id: u32,
    pub name: String,
    /// Independent violation probability is `weight * 0.7`
    pub weight: f64,
}

/// Procedure code range, e.g. 70000..=79999 for radiology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CptRange {
    pub min: u32,
    pub max: u32,
    pub category: String,
    pub weight: f64,
}

impl CptRange {
    pub fn contains(&self, code: u32) -> bool {
        (self.min..=self.max).contains(&code)
    }
}

/// ICD-10 chapter prefix letter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Icd10Prefix {
    pub prefix: char,
    pub category: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payer {
    pub name: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialty {
    pub name: String,
    pub weight: f64,
}

macro_rules! impl_weighted {
    ($($ty:ty),* $(,)?) => {
        $(impl Weighted for $ty {
            fn weight(&self) -> f64 {
                self.weight
            }
        })*
    };
}

impl_weighted!(PayerRule, CptRange, Icd10Prefix, Payer, Specialty);

/// Raw reference tables as they appear in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogSet {
    pub payer_rules: Vec<PayerRule>,
    pub cpt_ranges: Vec<CptRange>,
    pub icd10_prefixes: Vec<Icd10Prefix>,
    pub payers: Vec<Payer>,
    pub specialties: Vec<Specialty>,
}

impl Default for CatalogSet {
    fn default() -> Self {
        Self {
            payer_rules: vec![
                rule(1, "Missing pre-authorization", 0.15),
                rule(2, "Service not covered", 0.10),
                rule(3, "Provider network status issues", 0.10),
                rule(4, "Coding mismatches", 0.20),
                rule(5, "Medical necessity documentation", 0.18),
                rule(6, "Timely filing violation", 0.17),
                rule(7, "Patient eligibility issues", 0.12),
                rule(8, "Duplicate claim detection", 0.09),
                rule(9, "Bundling/unbundling errors", 0.08),
            ],
            cpt_ranges: vec![
                cpt(10000, 19999, "Anesthesia", 0.05),
                cpt(20000, 29999, "Surgery", 0.15),
                cpt(30000, 39999, "Surgery", 0.10),
                cpt(40000, 49999, "Surgery", 0.10),
                cpt(50000, 59999, "Surgery", 0.10),
                cpt(60000, 69999, "Surgery", 0.10),
                cpt(70000, 79999, "Radiology", 0.15),
                cpt(80000, 89999, "Pathology/Laboratory", 0.10),
                cpt(90000, 99999, "E/M and Medicine", 0.15),
            ],
            icd10_prefixes: vec![
                icd('A', "Infectious and parasitic diseases", 0.05),
                icd('C', "Neoplasms", 0.10),
                icd('E', "Endocrine, nutritional and metabolic diseases", 0.10),
                icd('F', "Mental and behavioral disorders", 0.15),
                icd('G', "Diseases of the nervous system", 0.10),
                icd('I', "Diseases of the circulatory system", 0.15),
                icd('J', "Diseases of the respiratory system", 0.15),
                icd('K', "Diseases of the digestive system", 0.05),
                icd('M', "Diseases of the musculoskeletal system", 0.10),
                icd('R', "Symptoms, signs and abnormal clinical findings", 0.05),
            ],
            payers: vec![
                payer("Medicare", 0.55),
                payer("Medicaid", 0.60),
                payer("Blue Cross", 0.45),
                payer("UnitedHealthcare", 0.50),
                payer("Aetna", 0.40),
                payer("Cigna", 0.57),
                payer("Humana", 0.48),
                payer("Anthem", 0.42),
            ],
            specialties: vec![
                specialty("Family Medicine", 0.40),
                specialty("Internal Medicine", 0.45),
                specialty("Cardiology", 0.55),
                specialty("Orthopedics", 0.50),
                specialty("Neurology", 0.56),
                specialty("Oncology", 0.52),
                specialty("Radiology", 0.48),
                specialty("Pathology", 0.42),
                specialty("Emergency Medicine", 0.58),
                specialty("Surgery", 0.60),
            ],
        }
    }
}

fn rule(id: u32, name: &str, weight: f64) -> PayerRule {
    PayerRule {
        id,
        name: name.to_string(),
        weight,
    }
}

fn cpt(min: u32, max: u32, category: &str, weight: f64) -> CptRange {
    CptRange {
        min,
        max,
        category: category.to_string(),
        weight,
    }
}

fn icd(prefix: char, category: &str, weight: f64) -> Icd10Prefix {
    Icd10Prefix {
        prefix,
        category: category.to_string(),
        weight,
    }
}

fn payer(name: &str, weight: f64) -> Payer {
    Payer {
        name: name.to_string(),
        weight,
    }
}

fn specialty(name: &str, weight: f64) -> Specialty {
    Specialty {
        name: name.to_string(),
        weight,
    }
}

fn check_weights<T: Weighted>(catalog: &'static str, items: &[T]) -> SimulationResult<()> {
    if items.is_empty() {
        return Err(SimulationError::InvalidConfiguration(format!(
            "{} catalog is empty",
            catalog
        )));
    }
    if let Some(bad) = items
        .iter()
        .map(Weighted::weight)
        .find(|w| !w.is_finite() || !(0.0..=1.0).contains(w))
    {
        return Err(SimulationError::InvalidConfiguration(format!(
            "{} catalog has weight {} outside [0, 1]",
            catalog, bad
        )));
    }
    Ok(())
}

fn check_positive_total<T: Weighted>(catalog: &'static str, items: &[T]) -> SimulationResult<()> {
    let total: f64 = items.iter().map(Weighted::weight).sum();
    if total <= 0.0 {
        return Err(SimulationError::InvalidConfiguration(format!(
            "{} catalog is sampled by weight and needs a positive total weight",
            catalog
        )));
    }
    Ok(())
}

fn index_unique<K>(
    catalog: &'static str,
    keys: impl Iterator<Item = K>,
) -> SimulationResult<HashMap<K, usize>>
where
    K: std::hash::Hash + Eq + std::fmt::Display,
{
    let mut index = HashMap::new();
    for (position, key) in keys.enumerate() {
        if index.contains_key(&key) {
            return Err(SimulationError::InvalidConfiguration(format!(
                "{} catalog has duplicate key '{}'",
                catalog, key
            )));
        }
        index.insert(key, position);
    }
    Ok(index)
}

/// Validated reference tables with keyed lookups.
///
/// Lookups never fall back to a default: a miss is a `LookupFailure`.
#[derive(Debug, Clone)]
pub struct ReferenceCatalogs {
    set: CatalogSet,
    rules_by_id: HashMap<u32, usize>,
    cpt_by_min: BTreeMap<u32, usize>,
    icd_by_prefix: HashMap<char, usize>,
    payers_by_name: HashMap<String, usize>,
    specialties_by_name: HashMap<String, usize>,
}

impl ReferenceCatalogs {
    /// Validate a catalog set and build its lookup indexes
    pub fn build(set: CatalogSet) -> SimulationResult<Self> {
        check_weights("payer rule", &set.payer_rules)?;
        check_weights("CPT range", &set.cpt_ranges)?;
        check_weights("ICD-10 prefix", &set.icd10_prefixes)?;
        check_weights("payer", &set.payers)?;
        check_weights("specialty", &set.specialties)?;
        check_positive_total("CPT range", &set.cpt_ranges)?;
        check_positive_total("ICD-10 prefix", &set.icd10_prefixes)?;

        if let Some(prefix) = set
            .icd10_prefixes
            .iter()
            .map(|p| p.prefix)
            .find(|c| !c.is_ascii_uppercase())
        {
            return Err(SimulationError::InvalidConfiguration(format!(
                "ICD-10 prefix '{}' must be an uppercase ASCII letter",
                prefix
            )));
        }

        let rules_by_id = index_unique("payer rule", set.payer_rules.iter().map(|r| r.id))?;
        let icd_by_prefix = index_unique("ICD-10 prefix", set.icd10_prefixes.iter().map(|p| p.prefix))?;
        let payers_by_name = index_unique("payer", set.payers.iter().map(|p| p.name.clone()))?;
        let specialties_by_name =
            index_unique("specialty", set.specialties.iter().map(|s| s.name.clone()))?;

        let mut cpt_by_min = BTreeMap::new();
        for (position, range) in set.cpt_ranges.iter().enumerate() {
            if range.min > range.max {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "CPT range {}..={} is inverted",
                    range.min, range.max
                )));
            }
            cpt_by_min.insert(range.min, position);
        }
        let mut previous: Option<&CptRange> = None;
        for position in cpt_by_min.values() {
            let range = set
                .cpt_ranges
                .get(*position)
                .ok_or_else(|| SimulationError::lookup("CPT range", position))?;
            if let Some(prev) = previous {
                if range.min <= prev.max {
                    return Err(SimulationError::InvalidConfiguration(format!(
                        "CPT ranges {}..={} and {}..={} overlap",
                        prev.min, prev.max, range.min, range.max
                    )));
                }
            }
            previous = Some(range);
        }
        if cpt_by_min.len() != set.cpt_ranges.len() {
            return Err(SimulationError::InvalidConfiguration(
                "CPT ranges must not share a lower bound".to_string(),
            ));
        }

        Ok(Self {
            set,
            rules_by_id,
            cpt_by_min,
            icd_by_prefix,
            payers_by_name,
            specialties_by_name,
        })
    }

    pub fn catalog_set(&self) -> &CatalogSet {
        &self.set
    }

    pub fn payer_rules(&self) -> &[PayerRule] {
        &self.set.payer_rules
    }

    pub fn cpt_ranges(&self) -> &[CptRange] {
        &self.set.cpt_ranges
    }

    pub fn icd10_prefixes(&self) -> &[Icd10Prefix] {
        &self.set.icd10_prefixes
    }

    pub fn payers(&self) -> &[Payer] {
        &self.set.payers
    }

    pub fn specialties(&self) -> &[Specialty] {
        &self.set.specialties
    }

    pub fn rule(&self, id: u32) -> SimulationResult<&PayerRule> {
        self.rules_by_id
            .get(&id)
            .and_then(|&i| self.set.payer_rules.get(i))
            .ok_or_else(|| SimulationError::lookup("payer rule", id))
    }

    /// Range whose bounds contain `code`
    pub fn cpt_range_for(&self, code: u32) -> SimulationResult<&CptRange> {
        self.cpt_by_min
            .range(..=code)
            .next_back()
            .and_then(|(_, &i)| self.set.cpt_ranges.get(i))
            .filter(|range| range.contains(code))
            .ok_or_else(|| SimulationError::lookup("CPT range", code))
    }

    /// Prefix entry for the chapter letter of an ICD-10 code
    pub fn icd_prefix_for(&self, code: &str) -> SimulationResult<&Icd10Prefix> {
        code.chars()
            .next()
            .and_then(|c| self.icd_by_prefix.get(&c))
            .and_then(|&i| self.set.icd10_prefixes.get(i))
            .ok_or_else(|| SimulationError::lookup("ICD-10 prefix", code))
    }

    pub fn payer(&self, name: &str) -> SimulationResult<&Payer> {
        self.payers_by_name
            .get(name)
            .and_then(|&i| self.set.payers.get(i))
            .ok_or_else(|| SimulationError::lookup("payer", name))
    }

    pub fn specialty(&self, name: &str) -> SimulationResult<&Specialty> {
        self.specialties_by_name
            .get(name)
            .and_then(|&i| self.set.specialties.get(i))
            .ok_or_else(|| SimulationError::lookup("specialty", name))
    }
}

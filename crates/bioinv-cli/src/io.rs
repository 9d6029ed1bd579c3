//! CSV input and output for the pipeline stages.
//!
//! Cells holding lists (URLs, name candidates, per-URL verification data)
//! are `", "`-joined, the convention of the upstream extraction tables.
//! Parsing is strict at the input boundary: wrong arity, unparsable
//! probabilities, or misaligned parallel lists abort the run with a
//! structured error. Unparsable URLs are NOT rejected here — they flow
//! through so the verification stage can record an error-classified status.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{bail, Context};
use bioinv_core::{
    strip_xml, CheckOutcome, GeoLocation, InventoryRecord, NamePrediction, NameType,
    PredictionRecord, UrlVerificationResult, VerifiedRecord,
};
use bioinv_epmc::Article;
use serde::{Deserialize, Serialize};

/// Separator for list-valued cells.
const LIST_SEP: &str = ", ";

/// Sentinel written when a URL has no archived snapshot.
const NO_WAYBACK: &str = "no_wayback";

/// One raw input row before validation.
#[derive(Debug, Deserialize)]
struct RawPredictionRow {
    id: String,
    title: String,
    #[serde(rename = "abstract")]
    abstract_text: String,
    #[serde(default)]
    extracted_url: String,
    #[serde(default)]
    common_name: String,
    #[serde(default)]
    common_prob: String,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    full_prob: String,
}

/// One raw verified row: the prediction columns plus per-URL lists.
/// Fields are spelled out because the csv deserializer does not handle
/// `serde(flatten)`.
#[derive(Debug, Deserialize)]
struct RawVerifiedRow {
    id: String,
    title: String,
    #[serde(rename = "abstract")]
    abstract_text: String,
    #[serde(default)]
    extracted_url: String,
    #[serde(default)]
    common_name: String,
    #[serde(default)]
    common_prob: String,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    full_prob: String,
    #[serde(default)]
    extracted_url_status: String,
    #[serde(default)]
    geo_country: String,
    #[serde(default)]
    geo_lat: String,
    #[serde(default)]
    geo_lon: String,
    #[serde(default)]
    archived_url: String,
}

impl RawVerifiedRow {
    fn prediction_columns(self) -> (RawPredictionRow, [String; 5]) {
        let lists = [
            self.extracted_url_status,
            self.geo_country,
            self.geo_lat,
            self.geo_lon,
            self.archived_url,
        ];
        let base = RawPredictionRow {
            id: self.id,
            title: self.title,
            abstract_text: self.abstract_text,
            extracted_url: self.extracted_url,
            common_name: self.common_name,
            common_prob: self.common_prob,
            full_name: self.full_name,
            full_prob: self.full_prob,
        };
        (base, lists)
    }
}

#[derive(Debug, Serialize)]
struct VerifiedRow<'a> {
    id: &'a str,
    title: &'a str,
    r#abstract: &'a str,
    extracted_url: String,
    common_name: String,
    common_prob: String,
    full_name: String,
    full_prob: String,
    extracted_url_status: String,
    geo_country: String,
    geo_lat: String,
    geo_lon: String,
    archived_url: String,
}

#[derive(Debug, Serialize)]
struct InventoryRow {
    id: String,
    extracted_url: String,
    extracted_url_status: String,
    geo_country: String,
    geo_lat: String,
    geo_lon: String,
    archived_url: String,
    best_common: String,
    best_common_prob: String,
    best_full: String,
    best_full_prob: String,
    best_name: String,
    best_name_prob: String,
    confidence: String,
}

#[derive(Debug, Serialize)]
struct ArticleRow<'a> {
    id: &'a str,
    title: &'a str,
    r#abstract: &'a str,
}

/// Reads prediction records from a CSV file.
///
/// # Errors
///
/// Fails when the file is unreadable or any row fails validation.
pub(crate) fn read_predictions(path: &Path) -> anyhow::Result<Vec<PredictionRecord>> {
    let file =
        File::open(path).with_context(|| format!("cannot open input file {}", path.display()))?;
    read_predictions_from(file).with_context(|| format!("while reading {}", path.display()))
}

/// Reads prediction records from any CSV source. Split from the path-based
/// entry point so tests can feed byte slices.
pub(crate) fn read_predictions_from(reader: impl Read) -> anyhow::Result<Vec<PredictionRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for (row_idx, row) in csv_reader.deserialize::<RawPredictionRow>().enumerate() {
        let row = row.with_context(|| format!("malformed CSV row {}", row_idx + 2))?;
        records.push(
            parse_prediction(row).with_context(|| format!("invalid row {}", row_idx + 2))?,
        );
    }
    Ok(records)
}

fn parse_prediction(row: RawPredictionRow) -> anyhow::Result<PredictionRecord> {
    if row.id.trim().is_empty() {
        bail!("article id is empty");
    }

    let urls = split_list(&row.extracted_url);

    let mut names = Vec::new();
    names.extend(parse_name_list(
        &row.common_name,
        &row.common_prob,
        NameType::Common,
        "common",
    )?);
    names.extend(parse_name_list(
        &row.full_name,
        &row.full_prob,
        NameType::Full,
        "full",
    )?);

    Ok(PredictionRecord {
        id: row.id.trim().to_owned(),
        title: strip_xml(&row.title),
        abstract_text: strip_xml(&row.abstract_text),
        urls,
        names,
    })
}

/// Parses parallel `", "`-joined name and probability lists of one type.
fn parse_name_list(
    names: &str,
    probs: &str,
    kind: NameType,
    label: &str,
) -> anyhow::Result<Vec<NamePrediction>> {
    let names = split_list(names);
    let probs = split_list(probs);
    if names.len() != probs.len() {
        bail!(
            "{label}_name has {} entries but {label}_prob has {}",
            names.len(),
            probs.len()
        );
    }

    names
        .into_iter()
        .zip(probs)
        .map(|(text, prob)| {
            let probability: f64 = prob
                .parse()
                .with_context(|| format!("unparsable {label}_prob value \"{prob}\""))?;
            if !(0.0..=1.0).contains(&probability) {
                bail!("{label}_prob value {probability} is outside [0, 1]");
            }
            Ok(NamePrediction {
                text,
                kind,
                probability,
            })
        })
        .collect()
}

/// Reads verified records (the output of the verify stage) from a CSV file.
///
/// # Errors
///
/// Fails when the file is unreadable, a row fails prediction validation, or
/// a per-URL list does not align with the URL list.
pub(crate) fn read_verified(path: &Path) -> anyhow::Result<Vec<VerifiedRecord>> {
    let file =
        File::open(path).with_context(|| format!("cannot open input file {}", path.display()))?;
    read_verified_from(file).with_context(|| format!("while reading {}", path.display()))
}

pub(crate) fn read_verified_from(reader: impl Read) -> anyhow::Result<Vec<VerifiedRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for (row_idx, row) in csv_reader.deserialize::<RawVerifiedRow>().enumerate() {
        let row = row.with_context(|| format!("malformed CSV row {}", row_idx + 2))?;
        records
            .push(parse_verified(row).with_context(|| format!("invalid row {}", row_idx + 2))?);
    }
    Ok(records)
}

fn parse_verified(row: RawVerifiedRow) -> anyhow::Result<VerifiedRecord> {
    let (base, [raw_statuses, raw_countries, raw_lats, raw_lons, raw_archived]) =
        row.prediction_columns();
    let statuses = split_list(&raw_statuses);
    let countries = split_list_keep_empty(&raw_countries);
    let lats = split_list_keep_empty(&raw_lats);
    let lons = split_list_keep_empty(&raw_lons);
    let archived = split_list_keep_empty(&raw_archived);
    let record = parse_prediction(base)?;

    let url_count = record.urls.len();
    for (column, len) in [
        ("extracted_url_status", statuses.len()),
        ("geo_country", countries.len()),
        ("geo_lat", lats.len()),
        ("geo_lon", lons.len()),
        ("archived_url", archived.len()),
    ] {
        if len != url_count {
            bail!("{column} has {len} entries for {url_count} URLs");
        }
    }

    let verifications = (0..url_count)
        .map(|i| {
            let geo = parse_geo(&countries[i], &lats[i], &lons[i])
                .with_context(|| format!("bad geolocation for URL {}", record.urls[i]))?;
            let archived_url = match archived[i].as_str() {
                "" | NO_WAYBACK => None,
                other => Some(other.to_owned()),
            };
            Ok(UrlVerificationResult {
                url: record.urls[i].clone(),
                outcome: parse_outcome(&statuses[i]),
                geo,
                archived_url,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(VerifiedRecord {
        record,
        verifications,
    })
}

/// Reconstructs an outcome from its status-column rendering: a numeric
/// status code, or anything else as the recorded network error message.
fn parse_outcome(cell: &str) -> CheckOutcome {
    match cell.parse::<u16>() {
        Ok(status) if status < 400 => CheckOutcome::Success(status),
        Ok(status) => CheckOutcome::ClientFailure(status),
        Err(_) => CheckOutcome::NetworkError(cell.to_owned()),
    }
}

fn parse_geo(country: &str, lat: &str, lon: &str) -> anyhow::Result<Option<GeoLocation>> {
    if country.is_empty() {
        return Ok(None);
    }
    let latitude: f64 = lat
        .parse()
        .with_context(|| format!("unparsable geo_lat \"{lat}\""))?;
    let longitude: f64 = lon
        .parse()
        .with_context(|| format!("unparsable geo_lon \"{lon}\""))?;
    Ok(Some(GeoLocation {
        country: country.to_owned(),
        latitude,
        longitude,
    }))
}

/// Writes the verify-stage output table.
///
/// # Errors
///
/// Fails on file creation or serialization errors.
pub(crate) fn write_verified(path: &Path, records: &[VerifiedRecord]) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    write_verified_to(file, records)
}

pub(crate) fn write_verified_to(
    writer: impl Write,
    records: &[VerifiedRecord],
) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for verified in records {
        let record = &verified.record;
        let checks = &verified.verifications;
        let (common, full): (Vec<_>, Vec<_>) = record
            .names
            .iter()
            .partition(|n| n.kind == NameType::Common);

        csv_writer.serialize(VerifiedRow {
            id: &record.id,
            title: &record.title,
            r#abstract: &record.abstract_text,
            extracted_url: record.urls.join(LIST_SEP),
            common_name: join_names(&common),
            common_prob: join_probs(&common),
            full_name: join_names(&full),
            full_prob: join_probs(&full),
            extracted_url_status: join_cells(checks.iter().map(|c| sanitize_cell(&c.outcome.to_string()))),
            geo_country: join_cells(
                checks
                    .iter()
                    .map(|c| c.geo.as_ref().map_or(String::new(), |g| g.country.clone())),
            ),
            geo_lat: join_cells(
                checks
                    .iter()
                    .map(|c| c.geo.as_ref().map_or(String::new(), |g| g.latitude.to_string())),
            ),
            geo_lon: join_cells(
                checks
                    .iter()
                    .map(|c| c.geo.as_ref().map_or(String::new(), |g| g.longitude.to_string())),
            ),
            archived_url: join_cells(checks.iter().map(|c| {
                c.archived_url
                    .clone()
                    .unwrap_or_else(|| NO_WAYBACK.to_owned())
            })),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes the final inventory table. Title/abstract are gone by this stage.
///
/// # Errors
///
/// Fails on file creation or serialization errors.
pub(crate) fn write_inventory(path: &Path, records: &[InventoryRecord]) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    write_inventory_to(file, records)
}

pub(crate) fn write_inventory_to(
    writer: impl Write,
    records: &[InventoryRecord],
) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        let checks = &record.urls;
        let names = &record.names;
        csv_writer.serialize(InventoryRow {
            id: record.ids.join(LIST_SEP),
            extracted_url: join_cells(checks.iter().map(|c| c.url.clone())),
            extracted_url_status: join_cells(checks.iter().map(|c| sanitize_cell(&c.outcome.to_string()))),
            geo_country: join_cells(
                checks
                    .iter()
                    .map(|c| c.geo.as_ref().map_or(String::new(), |g| g.country.clone())),
            ),
            geo_lat: join_cells(
                checks
                    .iter()
                    .map(|c| c.geo.as_ref().map_or(String::new(), |g| g.latitude.to_string())),
            ),
            geo_lon: join_cells(
                checks
                    .iter()
                    .map(|c| c.geo.as_ref().map_or(String::new(), |g| g.longitude.to_string())),
            ),
            archived_url: join_cells(checks.iter().map(|c| {
                c.archived_url
                    .clone()
                    .unwrap_or_else(|| NO_WAYBACK.to_owned())
            })),
            best_common: names
                .best_common
                .as_ref()
                .map_or(String::new(), |n| n.text.clone()),
            best_common_prob: names
                .best_common
                .as_ref()
                .map_or(String::new(), |n| n.probability.to_string()),
            best_full: names
                .best_full
                .as_ref()
                .map_or(String::new(), |n| n.text.clone()),
            best_full_prob: names
                .best_full
                .as_ref()
                .map_or(String::new(), |n| n.probability.to_string()),
            best_name: names
                .best_name
                .as_ref()
                .map_or(String::new(), |n| n.text.clone()),
            best_name_prob: names
                .best_name
                .as_ref()
                .map_or(String::new(), |n| n.probability.to_string()),
            confidence: record.confidence.as_str().to_owned(),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes query results as an (id, title, abstract) table.
///
/// # Errors
///
/// Fails on file creation or serialization errors.
pub(crate) fn write_articles(path: &Path, articles: &[Article]) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut csv_writer = csv::Writer::from_writer(file);
    for article in articles {
        csv_writer.serialize(ArticleRow {
            id: &article.id,
            title: &article.title,
            r#abstract: &article.abstract_text,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Splits a `", "`-joined list cell, dropping blank entries.
fn split_list(cell: &str) -> Vec<String> {
    cell.split(LIST_SEP)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Splits a list cell keeping blank entries, for parallel lists where an
/// empty slot means "absent for this URL".
fn split_list_keep_empty(cell: &str) -> Vec<String> {
    if cell.is_empty() {
        return Vec::new();
    }
    cell.split(LIST_SEP).map(|s| s.trim().to_owned()).collect()
}

fn join_cells(cells: impl Iterator<Item = String>) -> String {
    cells.collect::<Vec<_>>().join(LIST_SEP)
}

fn join_names(names: &[&NamePrediction]) -> String {
    names
        .iter()
        .map(|n| n.text.clone())
        .collect::<Vec<_>>()
        .join(LIST_SEP)
}

fn join_probs(names: &[&NamePrediction]) -> String {
    names
        .iter()
        .map(|n| n.probability.to_string())
        .collect::<Vec<_>>()
        .join(LIST_SEP)
}

/// Commas inside a cell entry would break the `", "` join on read-back, so
/// they are replaced before joining. Only network error messages can
/// contain them.
fn sanitize_cell(cell: &str) -> String {
    cell.replace(',', ";")
}

#[cfg(test)]
#[path = "io_test.rs"]
mod tests;

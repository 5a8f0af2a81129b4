// src/domain/property.rs

use crate::domain::logic::{group_thousands, join_list, strip_word, value_text};
use crate::scraper::models::{DetailDocument, PhotoSource};
use chrono::NaiveDateTime;
use serde_json::{Number, Value};
use std::collections::HashMap;

pub const FETCH_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column names in persisted order. Image columns (`Images1`, `Images2`, ...)
/// follow these and vary per record.
pub const FIXED_COLUMNS: [&str; 37] = [
    "ZPID",
    "url",
    "fetchDate",
    "streetAddress",
    "city",
    "state",
    "zipcode",
    "price",
    "bedrooms",
    "bathrooms",
    "livingArea",
    "yearBuilt",
    "propertyType",
    "status",
    "daysOnZillow",
    "views",
    "saved",
    "priceHistory",
    "description",
    "schools",
    "propertyTaxRate",
    "annualHomeownersInsurance",
    "hoaFee",
    "appliances",
    "heating",
    "cooling",
    "parkingFeatures",
    "openHouseSchedule",
    "mlsId",
    "mlsName",
    "agentName",
    "agentPhoneNumber",
    "coAgentName",
    "coAgentNumber",
    "brokerName",
    "brokerPhoneNumber",
    "propertyJSON",
];

pub const IMAGE_COLUMN_PREFIX: &str = "Images";

pub fn image_column(position: usize) -> String {
    format!("{IMAGE_COLUMN_PREFIX}{}", position + 1)
}

/// A single persisted cell. Numbers stay numbers so the workbook mirror
/// can write them as such; absent numbers stay empty, never zero.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(Number),
    Empty,
}

impl Cell {
    fn text(s: &str) -> Self {
        Cell::Text(s.to_string())
    }

    fn number(n: &Option<Number>) -> Self {
        match n {
            Some(n) => Cell::Number(n.clone()),
            None => Cell::Empty,
        }
    }

    pub fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

/// A detail document flattened into one row, keyed by `zpid`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyRecord {
    pub zpid: String,
    pub url: String,
    /// `%Y-%m-%d %H:%M:%S`; fixed width, so string order is time order.
    pub fetch_date: String,

    // Address
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,

    // Facts
    pub price: Option<Number>,
    pub bedrooms: Option<Number>,
    pub bathrooms: Option<Number>,
    pub living_area: Option<Number>,
    pub year_built: String,
    pub property_type: String,
    pub status: String,
    pub days_on_zillow: String,
    pub views: Option<Number>,
    pub saved: Option<Number>,

    // Formatted lists
    pub price_history: String,
    pub description: String,
    pub schools: String,

    // Costs
    pub property_tax_rate: Option<Number>,
    pub annual_homeowners_insurance: Option<Number>,
    pub hoa_fee: String,

    // Features
    pub appliances: String,
    pub heating: String,
    pub cooling: String,
    pub parking_features: String,
    pub open_house_schedule: String,

    // Attribution
    pub mls_id: String,
    pub mls_name: String,
    pub agent_name: String,
    pub agent_phone_number: String,
    pub co_agent_name: String,
    pub co_agent_number: String,
    pub broker_name: String,
    pub broker_phone_number: String,

    /// Pretty-printed raw document, kept for auditing.
    pub property_json: String,

    /// Highest-resolution JPEG per photo, in photo order.
    pub images: Vec<String>,
}

/// Flattens a detail document into a record. Pure: the fetch time is passed in.
pub fn normalize(doc: &DetailDocument, zpid: &str, fetched_at: NaiveDateTime) -> PropertyRecord {
    let d = &doc.detail;
    let address = d.address.clone().unwrap_or_default();
    let reso = d.reso_facts.clone().unwrap_or_default();
    let attribution = d.attribution_info.clone().unwrap_or_default();

    // Later facts win on duplicate labels.
    let facts: HashMap<&str, Option<&Value>> = reso
        .at_a_glance_facts
        .iter()
        .flatten()
        .filter_map(|fact| Some((fact.fact_label.as_deref()?, fact.fact_value.as_ref())))
        .collect();
    let fact = |label: &str| value_text(facts.get(label).copied().flatten());

    PropertyRecord {
        zpid: zpid.to_string(),
        url: format!("https://www.zillow.com/homedetails/{zpid}_zpid/"),
        fetch_date: fetched_at.format(FETCH_DATE_FORMAT).to_string(),

        street_address: address.street_address.unwrap_or_default(),
        city: address.city.unwrap_or_default(),
        state: address.state.unwrap_or_default(),
        zipcode: address.zipcode.unwrap_or_default(),

        price: d.price.clone(),
        bedrooms: d.bedrooms.clone(),
        bathrooms: d.bathrooms.clone(),
        living_area: d.living_area.clone(),
        year_built: fact("Year Built"),
        property_type: reso.home_type.clone().unwrap_or_default(),
        status: d.home_status.clone().unwrap_or_default(),
        days_on_zillow: strip_word(&fact("Days on Zillow"), "Days"),
        views: d.page_view_count.clone(),
        saved: d.favorite_count.clone(),

        price_history: format_price_history(doc),
        description: d.description.as_deref().unwrap_or("").replace('\n', " "),
        schools: format_schools(doc),

        property_tax_rate: d.property_tax_rate.clone(),
        annual_homeowners_insurance: d.annual_homeowners_insurance.clone(),
        hoa_fee: strip_word(reso.hoa_fee.as_deref().unwrap_or(""), "monthly"),

        appliances: join_list(reso.appliances.as_ref()),
        heating: join_list(reso.heating.as_ref()),
        cooling: join_list(reso.cooling.as_ref()),
        parking_features: join_list(reso.parking_features.as_ref()),
        open_house_schedule: format_open_house(doc),

        mls_id: value_text(attribution.mls_id.as_ref()),
        mls_name: value_text(attribution.mls_name.as_ref()),
        agent_name: value_text(attribution.agent_name.as_ref()),
        agent_phone_number: value_text(attribution.agent_phone_number.as_ref()),
        co_agent_name: value_text(attribution.co_agent_name.as_ref()),
        co_agent_number: value_text(attribution.co_agent_number.as_ref()),
        broker_name: value_text(attribution.broker_name.as_ref()),
        broker_phone_number: value_text(attribution.broker_phone_number.as_ref()),

        property_json: serde_json::to_string_pretty(&doc.raw).unwrap_or_default(),

        images: extract_images(doc),
    }
}

/// `date: $price (event)` per entry; a missing price renders as `N/A`.
fn format_price_history(doc: &DetailDocument) -> String {
    doc.detail
        .price_history
        .iter()
        .flatten()
        .map(|item| {
            let price = match &item.price {
                Some(p) => format!("${}", group_thousands(p)),
                None => "N/A".to_string(),
            };
            format!(
                "{}: {} ({})",
                item.date.as_deref().unwrap_or(""),
                price,
                item.event.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// A missing or `null` rating renders as `N/A`, a missing name as `Unknown`.
fn format_schools(doc: &DetailDocument) -> String {
    doc.detail
        .schools
        .iter()
        .flatten()
        .map(|school| {
            let rating = match &school.rating {
                None | Some(Value::Null) => "N/A".to_string(),
                rating => value_text(rating.as_ref()),
            };
            format!(
                "Rating: {} Name: {}",
                rating,
                school.name.as_deref().unwrap_or("Unknown")
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `openHouse` when the document has it, `openHouseSchedule` otherwise.
fn format_open_house(doc: &DetailDocument) -> String {
    let d = &doc.detail;
    d.open_house
        .as_ref()
        .or(d.open_house_schedule.as_ref())
        .into_iter()
        .flatten()
        .map(|window| {
            format!(
                "{} - {}",
                window.start_time.as_deref().unwrap_or(""),
                window.end_time.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// The last JPEG source of each photo is the largest one.
fn extract_images(doc: &DetailDocument) -> Vec<String> {
    doc.detail
        .responsive_photos
        .iter()
        .flatten()
        .filter_map(|photo| {
            let jpeg = photo.mixed_sources.as_ref()?.jpeg.as_ref()?;
            jpeg.last().and_then(|src: &PhotoSource| src.url.clone())
        })
        .collect()
}

impl PropertyRecord {
    /// Cells in `FIXED_COLUMNS` order, followed by one cell per image.
    pub fn cells(&self) -> Vec<Cell> {
        let mut cells = vec![
            Cell::text(&self.zpid),
            Cell::text(&self.url),
            Cell::text(&self.fetch_date),
            Cell::text(&self.street_address),
            Cell::text(&self.city),
            Cell::text(&self.state),
            Cell::text(&self.zipcode),
            Cell::number(&self.price),
            Cell::number(&self.bedrooms),
            Cell::number(&self.bathrooms),
            Cell::number(&self.living_area),
            Cell::text(&self.year_built),
            Cell::text(&self.property_type),
            Cell::text(&self.status),
            Cell::text(&self.days_on_zillow),
            Cell::number(&self.views),
            Cell::number(&self.saved),
            Cell::text(&self.price_history),
            Cell::text(&self.description),
            Cell::text(&self.schools),
            Cell::number(&self.property_tax_rate),
            Cell::number(&self.annual_homeowners_insurance),
            Cell::text(&self.hoa_fee),
            Cell::text(&self.appliances),
            Cell::text(&self.heating),
            Cell::text(&self.cooling),
            Cell::text(&self.parking_features),
            Cell::text(&self.open_house_schedule),
            Cell::text(&self.mls_id),
            Cell::text(&self.mls_name),
            Cell::text(&self.agent_name),
            Cell::text(&self.agent_phone_number),
            Cell::text(&self.co_agent_name),
            Cell::text(&self.co_agent_number),
            Cell::text(&self.broker_name),
            Cell::text(&self.broker_phone_number),
            Cell::text(&self.property_json),
        ];
        cells.extend(self.images.iter().map(|url| Cell::text(url)));
        cells
    }

    /// Rebuilds a record from named text cells. Unknown columns are ignored,
    /// missing ones default to empty.
    pub fn from_named<'a, F>(get: F, images: Vec<String>) -> Self
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let text = |col: &str| get(col).unwrap_or("").to_string();
        let number = |col: &str| {
            get(col)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .and_then(|s| s.parse::<Number>().ok())
        };

        PropertyRecord {
            zpid: text("ZPID"),
            url: text("url"),
            fetch_date: text("fetchDate"),
            street_address: text("streetAddress"),
            city: text("city"),
            state: text("state"),
            zipcode: text("zipcode"),
            price: number("price"),
            bedrooms: number("bedrooms"),
            bathrooms: number("bathrooms"),
            living_area: number("livingArea"),
            year_built: text("yearBuilt"),
            property_type: text("propertyType"),
            status: text("status"),
            days_on_zillow: text("daysOnZillow"),
            views: number("views"),
            saved: number("saved"),
            price_history: text("priceHistory"),
            description: text("description"),
            schools: text("schools"),
            property_tax_rate: number("propertyTaxRate"),
            annual_homeowners_insurance: number("annualHomeownersInsurance"),
            hoa_fee: text("hoaFee"),
            appliances: text("appliances"),
            heating: text("heating"),
            cooling: text("cooling"),
            parking_features: text("parkingFeatures"),
            open_house_schedule: text("openHouseSchedule"),
            mls_id: text("mlsId"),
            mls_name: text("mlsName"),
            agent_name: text("agentName"),
            agent_phone_number: text("agentPhoneNumber"),
            co_agent_name: text("coAgentName"),
            co_agent_number: text("coAgentNumber"),
            broker_name: text("brokerName"),
            broker_phone_number: text("brokerPhoneNumber"),
            property_json: text("propertyJSON"),
            images,
        }
    }
}

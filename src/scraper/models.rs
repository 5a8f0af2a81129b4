use crate::config::{MapBounds, SearchArea};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

// Search request body
//  ├── searchQueryState
//  │    ├── pagination.currentPage
//  │    ├── mapBounds { west, east, south, north }
//  │    ├── regionSelection [ { regionId, regionType } ]
//  │    └── filterState.sortSelection.value
//  ├── wants.cat1 = ["mapResults"]
//  └── requestId

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub search_query_state: SearchQueryState,
    pub wants: Wants,
    pub request_id: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQueryState {
    pub pagination: Pagination,
    pub is_map_visible: bool,
    pub map_bounds: Bounds,
    pub region_selection: Vec<RegionSelection>,
    pub filter_state: FilterState,
    pub is_list_visible: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
}

#[derive(Debug, Serialize)]
pub struct Bounds {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl From<MapBounds> for Bounds {
    fn from(b: MapBounds) -> Self {
        Self {
            west: b.west,
            east: b.east,
            south: b.south,
            north: b.north,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSelection {
    pub region_id: i64,
    pub region_type: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub sort_selection: SortSelection,
}

#[derive(Debug, Serialize)]
pub struct SortSelection {
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct Wants {
    pub cat1: Vec<String>,
}

impl SearchQuery {
    pub fn for_page(area: &SearchArea, page: u32) -> Self {
        Self {
            search_query_state: SearchQueryState {
                pagination: Pagination { current_page: page },
                is_map_visible: true,
                map_bounds: area.bounds.into(),
                region_selection: vec![RegionSelection {
                    region_id: area.region_id,
                    region_type: area.region_type,
                }],
                filter_state: FilterState {
                    sort_selection: SortSelection {
                        value: area.sort.clone(),
                    },
                },
                is_list_visible: true,
            },
            wants: Wants {
                cat1: vec!["mapResults".to_string()],
            },
            request_id: 2,
        }
    }
}

/// One entry of `cat1.searchResults.mapResults`. Only the id matters here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub zpid: String,
}

impl ListingEntry {
    /// The search API sends `zpid` as either a string or a number.
    pub fn from_value(v: &Value) -> Option<Self> {
        let zpid = match v.get("zpid")? {
            Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some(Self { zpid })
    }
}

// Detail document (data.property), only the parts we flatten
//  ├── address { streetAddress, city, state, zipcode }
//  ├── price, bedrooms, bathrooms, livingArea, homeStatus, description
//  ├── resoFacts
//  │    ├── atAGlanceFacts [ { factLabel, factValue } ]
//  │    ├── homeType, hoaFee
//  │    └── appliances / heating / cooling / parkingFeatures
//  ├── priceHistory [ { date, price, event } ]
//  ├── schools [ { rating, name } ]
//  ├── openHouse / openHouseSchedule [ { startTime, endTime } ]
//  ├── responsivePhotos [ { mixedSources { jpeg [ { url, width } ] } } ]
//  └── attributionInfo { mlsId, mlsName, agentName, ... }

// Every field is best effort: a value of the wrong type reads as absent
// instead of failing the whole document. Scalars read as text keep numbers
// as their decimal form.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyDetail {
    #[serde(deserialize_with = "lenient")]
    pub address: Option<Address>,
    #[serde(deserialize_with = "lenient")]
    pub price: Option<Number>,
    #[serde(deserialize_with = "lenient")]
    pub bedrooms: Option<Number>,
    #[serde(deserialize_with = "lenient")]
    pub bathrooms: Option<Number>,
    #[serde(deserialize_with = "lenient")]
    pub living_area: Option<Number>,
    #[serde(deserialize_with = "lenient_text")]
    pub home_status: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub page_view_count: Option<Number>,
    #[serde(deserialize_with = "lenient")]
    pub favorite_count: Option<Number>,
    #[serde(deserialize_with = "lenient")]
    pub property_tax_rate: Option<Number>,
    #[serde(deserialize_with = "lenient")]
    pub annual_homeowners_insurance: Option<Number>,
    #[serde(deserialize_with = "lenient")]
    pub reso_facts: Option<ResoFacts>,
    #[serde(deserialize_with = "lenient")]
    pub price_history: Option<Vec<PriceEvent>>,
    #[serde(deserialize_with = "lenient")]
    pub schools: Option<Vec<School>>,
    #[serde(deserialize_with = "lenient")]
    pub open_house: Option<Vec<OpenHouse>>,
    #[serde(deserialize_with = "lenient")]
    pub open_house_schedule: Option<Vec<OpenHouse>>,
    #[serde(deserialize_with = "lenient")]
    pub responsive_photos: Option<Vec<Photo>>,
    #[serde(deserialize_with = "lenient")]
    pub attribution_info: Option<AttributionInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    #[serde(deserialize_with = "lenient_text")]
    pub street_address: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub city: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub state: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub zipcode: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResoFacts {
    #[serde(deserialize_with = "lenient")]
    pub at_a_glance_facts: Option<Vec<Fact>>,
    #[serde(deserialize_with = "lenient_text")]
    pub home_type: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub hoa_fee: Option<String>,
    // Usually a list of strings, but not always.
    pub appliances: Option<Value>,
    pub heating: Option<Value>,
    pub cooling: Option<Value>,
    pub parking_features: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Fact {
    #[serde(deserialize_with = "lenient_text")]
    pub fact_label: Option<String>,
    pub fact_value: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PriceEvent {
    #[serde(deserialize_with = "lenient_text")]
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub price: Option<Number>,
    #[serde(deserialize_with = "lenient_text")]
    pub event: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct School {
    pub rating: Option<Value>,
    #[serde(deserialize_with = "lenient_text")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpenHouse {
    #[serde(deserialize_with = "lenient_text")]
    pub start_time: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Photo {
    #[serde(deserialize_with = "lenient")]
    pub mixed_sources: Option<MixedSources>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MixedSources {
    #[serde(deserialize_with = "lenient")]
    pub jpeg: Option<Vec<PhotoSource>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PhotoSource {
    #[serde(deserialize_with = "lenient_text")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub width: Option<Number>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttributionInfo {
    // Ids and phone numbers show up as both strings and numbers.
    pub mls_id: Option<Value>,
    pub mls_name: Option<Value>,
    pub agent_name: Option<Value>,
    pub agent_phone_number: Option<Value>,
    pub co_agent_name: Option<Value>,
    pub co_agent_number: Option<Value>,
    pub broker_name: Option<Value>,
    pub broker_phone_number: Option<Value>,
}

/// Reads `T` if the value has the right shape, `None` otherwise.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok().flatten())
}

/// Strings as-is, numbers and booleans as their JSON text, anything else `None`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        v @ (Value::Number(_) | Value::Bool(_)) => Some(v.to_string()),
        _ => None,
    };
    Ok(text)
}

/// A fetched detail document: the typed view used for flattening plus the
/// untouched JSON kept for the audit column.
#[derive(Debug, Clone)]
pub struct DetailDocument {
    pub detail: PropertyDetail,
    pub raw: Value,
}

impl DetailDocument {
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        let detail = PropertyDetail::deserialize(&raw)?;
        Ok(Self { detail, raw })
    }
}

//! Registry XML response parsing
//!
//! Responses look like
//! `<response><header><resultCode>000</resultCode>...</header>
//! <body><items><item>...</item></items></body></response>`.
//! Field labels differ between API generations (Korean labels in the old
//! API, camelCase in the new one), so each logical field lists its variants
//! and the first non-empty one wins.

use super::registry_client::RegistryError;
use crate::models::{RentTransaction, SaleTransaction};
use crate::utils::parse_amount;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;

const APT_NAME: &[&str] = &["아파트", "aptNm", "아파트명"];
const DONG_NAME: &[&str] = &["법정동", "법정동명", "법정동주소", "umdNm"];
const JIBUN: &[&str] = &["지번", "jibun"];
const BONBUN: &[&str] = &["본번", "bonbun"];
const BUBUN: &[&str] = &["부번", "bubun"];
const DEAL_YEAR: &[&str] = &["년", "dealYear", "거래년도"];
const DEAL_MONTH: &[&str] = &["월", "dealMonth", "거래월"];
const DEAL_DAY: &[&str] = &["일", "dealDay", "거래일"];
const AREA: &[&str] = &[
    "전용면적",
    "전용면적㎡",
    "전용면적(㎡)",
    "면적",
    "면적㎡",
    "area",
    "전용면적(평)",
    "excluUseAr",
];
const FLOOR: &[&str] = &["층", "층수", "floor"];
const BUILD_YEAR: &[&str] = &["건축년도", "buildYear", "건축년"];
const REGION_CODE: &[&str] = &["지역코드", "lawdCd", "sggCd"];
const SALE_PRICE: &[&str] = &["거래금액", "dealAmount"];
const DEPOSIT: &[&str] = &["보증금", "보증금액", "deposit"];
const MONTHLY_RENT: &[&str] = &["월세금액", "월세", "rent", "monthlyRent"];

/// Result codes the registry uses for success
const SUCCESS_CODES: &[&str] = &["00", "000"];

/// Child element texts of one `<item>`
#[derive(Debug, Default, Clone)]
struct Item {
    fields: HashMap<String, String>,
}

impl Item {
    /// First non-empty value among `labels`, trimmed
    fn first(&self, labels: &[&str]) -> String {
        labels
            .iter()
            .filter_map(|l| self.fields.get(*l))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
            .unwrap_or_default()
            .to_string()
    }

    fn jibun(&self) -> String {
        let jibun = self.first(JIBUN);
        if !jibun.is_empty() {
            return jibun;
        }
        let bonbun = self.first(BONBUN);
        let bubun = self.first(BUBUN);
        if bonbun.is_empty() && bubun.is_empty() {
            String::new()
        } else {
            format!("{}-{}", bonbun, bubun)
        }
    }

    fn deal_date(&self) -> String {
        let year = self.first(DEAL_YEAR);
        let month = self.first(DEAL_MONTH);
        let day = self.first(DEAL_DAY);
        if year.is_empty() || month.is_empty() || day.is_empty() {
            return String::new();
        }
        format!("{}-{:0>2}-{:0>2}", year, month, day)
    }
}

/// Parsed document: header result plus raw items
#[derive(Debug, Default)]
struct Document {
    result_code: Option<String>,
    result_msg: Option<String>,
    items: Vec<Item>,
}

impl Document {
    fn check_result(&self) -> Result<(), RegistryError> {
        match &self.result_code {
            Some(code) if !SUCCESS_CODES.contains(&code.as_str()) => Err(RegistryError::Service {
                code: code.clone(),
                message: self.result_msg.clone().unwrap_or_default(),
            }),
            _ => Ok(()),
        }
    }
}

fn parse_document(xml: &str) -> Result<Document, RegistryError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut doc = Document::default();
    let mut stack: Vec<String> = Vec::new();
    // Depth of the open <item>, if any
    let mut item_depth: Option<usize> = None;
    let mut current = Item::default();
    let mut saw_root = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| RegistryError::Parse(format!("XML error at {}: {}", reader.buffer_position(), e)))?;

        match event {
            Event::Start(e) => {
                saw_root = true;
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "item" && item_depth.is_none() {
                    item_depth = Some(stack.len() + 1);
                    current = Item::default();
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                saw_root = true;
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if let Some(depth) = item_depth {
                    if stack.len() == depth {
                        current.fields.entry(name).or_default();
                    }
                }
            }
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| RegistryError::Parse(format!("Bad text: {}", e)))?;
                record_text(&mut doc, &mut current, &stack, item_depth, &text);
            }
            Event::CData(c) => {
                let raw = c.into_inner();
                let text = String::from_utf8_lossy(&raw);
                record_text(&mut doc, &mut current, &stack, item_depth, &text);
            }
            Event::End(_) => {
                if item_depth == Some(stack.len()) {
                    doc.items.push(std::mem::take(&mut current));
                    item_depth = None;
                }
                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(RegistryError::Parse("Empty document".to_string()));
    }
    if let Some(open) = stack.last() {
        return Err(RegistryError::Parse(format!("Unclosed element <{}>", open)));
    }
    Ok(doc)
}

fn record_text(
    doc: &mut Document,
    current: &mut Item,
    stack: &[String],
    item_depth: Option<usize>,
    text: &str,
) {
    let Some(tag) = stack.last() else {
        return;
    };

    if let Some(depth) = item_depth {
        // Only direct children of <item> are fields
        if stack.len() == depth + 1 {
            current.fields.entry(tag.clone()).or_default().push_str(text);
        }
        return;
    }

    match tag.as_str() {
        "resultCode" | "returnReasonCode" => doc.result_code = Some(text.trim().to_string()),
        "resultMsg" | "returnAuthMsg" | "errMsg" => {
            if doc.result_msg.is_none() || tag != "errMsg" {
                doc.result_msg = Some(text.trim().to_string());
            }
        }
        _ => {}
    }
}

fn sale_from_item(item: &Item) -> SaleTransaction {
    let price_raw = item.first(SALE_PRICE);
    SaleTransaction {
        apt_name: item.first(APT_NAME),
        dong_name: item.first(DONG_NAME),
        jibun: item.jibun(),
        area: item.first(AREA),
        floor: item.first(FLOOR),
        build_year: item.first(BUILD_YEAR),
        deal_date: item.deal_date(),
        price: parse_amount(&price_raw),
        price_raw,
        region_code: item.first(REGION_CODE),
    }
}

fn rent_from_item(item: &Item) -> RentTransaction {
    RentTransaction {
        apt_name: item.first(APT_NAME),
        dong_name: item.first(DONG_NAME),
        jibun: item.jibun(),
        area: item.first(AREA),
        floor: item.first(FLOOR),
        build_year: item.first(BUILD_YEAR),
        deal_date: item.deal_date(),
        deposit: parse_amount(&item.first(DEPOSIT)),
        monthly_rent: parse_amount(&item.first(MONTHLY_RENT)),
        region_code: item.first(REGION_CODE),
    }
}

/// Parse a sale response body
pub fn parse_sales(xml: &str) -> Result<Vec<SaleTransaction>, RegistryError> {
    let doc = parse_document(xml)?;
    doc.check_result()?;
    Ok(doc.items.iter().map(sale_from_item).collect())
}

/// Parse a rent response body
pub fn parse_rents(xml: &str) -> Result<Vec<RentTransaction>, RegistryError> {
    let doc = parse_document(xml)?;
    doc.check_result()?;
    Ok(doc.items.iter().map(rent_from_item).collect())
}

//! Spreadsheet rows for a published list of candidates.
//!
//! A column pulls its value (and optionally a hyperlink target) from a candidate field,
//! a candidate property or a constant. A column whose value is a JSON property expands
//! into one extra row per JSON entry, so dependants and similar lists can be shown
//! underneath the candidate they belong to.

use std::collections::BTreeMap;

use entity::{candidate, candidate_attachment, candidate_property, users};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::cv_token::CandidateTokenProvider;
use crate::error::{TalentError, TalentResult};

pub const DEFAULT_PUBLIC_CV_BASE_URL: &str = "https://tctalent.org/public-portal/cv/";
const CV_TOKEN_VALID_DAYS: i64 = 365;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PropertyType {
    #[default]
    String,
    Json,
}

/// Where a cell gets its data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum ValueSource {
    #[serde(rename_all = "camelCase")]
    Field { field_name: String },
    #[serde(rename_all = "camelCase")]
    Property {
        property_name: String,
        #[serde(default)]
        property_type: PropertyType,
    },
    Constant { constant: Value },
}

impl ValueSource {
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field {
            field_name: name.into(),
        }
    }

    pub fn property(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self::Property {
            property_name: name.into(),
            property_type,
        }
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Self::Constant {
            constant: value.into(),
        }
    }

    /// Key used to look this source up in an expanded JSON row.
    fn source_name(&self) -> Option<&str> {
        match self {
            ValueSource::Field { field_name } => Some(field_name),
            ValueSource::Property { property_name, .. } => Some(property_name),
            ValueSource::Constant { .. } => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnContent {
    #[serde(default)]
    pub value: Option<ValueSource>,
    #[serde(default)]
    pub link: Option<ValueSource>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub key: String,
    pub header: String,
    #[serde(default)]
    pub content: ColumnContent,
}

impl ColumnDef {
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            content: ColumnContent::default(),
        }
    }

    pub fn with_value(mut self, value: ValueSource) -> Self {
        self.content.value = Some(value);
        self
    }

    pub fn with_link(mut self, link: ValueSource) -> Self {
        self.content.link = Some(link);
        self
    }

    /// True when the value is a JSON property that expands into extra rows.
    pub fn is_expanding(&self) -> bool {
        matches!(
            self.content.value,
            Some(ValueSource::Property {
                property_type: PropertyType::Json,
                ..
            })
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("unknown candidate field `{0}`")]
    Unknown(String),
}

/// Everything needed to resolve fields of one candidate.
#[derive(Clone, Debug)]
pub struct CandidateView {
    pub candidate: candidate::Model,
    pub user: Option<users::Model>,
    pub shareable_cv: Option<candidate_attachment::Model>,
    pub shareable_doc: Option<candidate_attachment::Model>,
    /// List specific overrides of the shareable attachments.
    pub list_shareable_cv: Option<candidate_attachment::Model>,
    pub list_shareable_doc: Option<candidate_attachment::Model>,
    pub properties: BTreeMap<String, Option<String>>,
}

impl CandidateView {
    pub fn new(candidate: candidate::Model) -> Self {
        Self {
            candidate,
            user: None,
            shareable_cv: None,
            shareable_doc: None,
            list_shareable_cv: None,
            list_shareable_doc: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn candidate_number(&self) -> &str {
        &self.candidate.candidate_number
    }

    fn attachment_document(attachment: &Option<candidate_attachment::Model>) -> Value {
        match attachment {
            Some(attachment) => {
                let mut doc = serde_json::to_value(attachment).unwrap_or(Value::Null);
                if let Value::Object(map) = &mut doc {
                    map.insert("url".into(), Value::String(attachment.location.clone()));
                }
                doc
            }
            None => Value::Null,
        }
    }

    fn document(&self) -> Value {
        let mut doc = match serde_json::to_value(&self.candidate) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        let user = match &self.user {
            Some(user) => {
                let mut value = serde_json::to_value(user).unwrap_or(Value::Null);
                if let Value::Object(map) = &mut value {
                    map.insert("displayName".into(), Value::String(user.display_name()));
                }
                value
            }
            None => Value::Null,
        };
        doc.insert("user".into(), user);
        doc.insert("shareableCv".into(), Self::attachment_document(&self.shareable_cv));
        doc.insert("shareableDoc".into(), Self::attachment_document(&self.shareable_doc));
        doc.insert(
            "listShareableCv".into(),
            Self::attachment_document(&self.list_shareable_cv),
        );
        doc.insert(
            "listShareableDoc".into(),
            Self::attachment_document(&self.list_shareable_doc),
        );
        Value::Object(doc)
    }

    /// Resolve a dotted field path such as `user.email` or `shareableCv.url`.
    ///
    /// A user object resolves to the display name, `candidateNumber` to a number when
    /// it is numeric and phone numbers get a leading `'` so spreadsheets keep them as
    /// text. A null anywhere along the path gives null.
    pub fn extract_field(&self, path: &str) -> Result<Value, FieldError> {
        let doc = self.document();
        let mut current = &doc;
        for segment in path.split('.') {
            current = match current {
                Value::Null => return Ok(Value::Null),
                Value::Object(map) => map
                    .get(segment)
                    .ok_or_else(|| FieldError::Unknown(path.to_string()))?,
                _ => return Err(FieldError::Unknown(path.to_string())),
            };
        }

        let last = path.rsplit('.').next().unwrap_or(path);
        Ok(match (last, current) {
            (_, Value::Object(map)) if map.contains_key("displayName") => {
                map.get("displayName").cloned().unwrap_or(Value::Null)
            }
            ("candidateNumber", Value::String(number)) => number
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(number.clone())),
            ("phone" | "whatsapp", Value::String(number)) => Value::String(format!("'{number}")),
            (_, value) => value.clone(),
        })
    }
}

/// Rows of a JSON array, addressed by row index and key.
#[derive(Clone, Debug, PartialEq)]
pub struct JsonRows {
    rows: Vec<Value>,
}

impl JsonRows {
    /// `None` unless `raw` is a JSON array.
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(rows)) => Some(Self { rows }),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize, name: Option<&str>) -> Option<Value> {
        let value = self.rows.get(index)?.get(name?)?;
        (!value.is_null()).then(|| value.clone())
    }
}

pub struct PublishedDocBuilder<'a> {
    token_provider: &'a dyn CandidateTokenProvider,
    public_cv_base_url: String,
}

impl<'a> PublishedDocBuilder<'a> {
    pub fn new(token_provider: &'a dyn CandidateTokenProvider) -> Self {
        Self {
            token_provider,
            public_cv_base_url: DEFAULT_PUBLIC_CV_BASE_URL.to_string(),
        }
    }

    pub fn with_public_cv_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.public_cv_base_url = base_url.into();
        self
    }

    fn auto_cv_link(&self, candidate: &CandidateView) -> Value {
        match self
            .token_provider
            .generate_token(candidate.candidate_number(), CV_TOKEN_VALID_DAYS)
        {
            Ok(token) => Value::String(format!("{}{}", self.public_cv_base_url, token)),
            Err(err) => {
                tracing::error!(
                    candidate_number = candidate.candidate_number(),
                    error = %err,
                    "could not build public CV link"
                );
                Value::Null
            }
        }
    }

    fn extract(&self, candidate: &CandidateView, field_name: &str) -> Result<Value, FieldError> {
        match field_name {
            "shareableCv.url" if candidate.list_shareable_cv.is_some() => {
                candidate.extract_field("listShareableCv.url")
            }
            "shareableDoc.url" if candidate.list_shareable_doc.is_some() => {
                candidate.extract_field("listShareableDoc.url")
            }
            "autoCvLink" => Ok(self.auto_cv_link(candidate)),
            "smartCvLink" => {
                if candidate.list_shareable_cv.is_some() {
                    candidate.extract_field("listShareableCv.url")
                } else if candidate.shareable_cv.is_some() {
                    candidate.extract_field("shareableCv.url")
                } else {
                    Ok(self.auto_cv_link(candidate))
                }
            }
            other => candidate.extract_field(other),
        }
    }

    /// Value of `source` for `candidate`, or null when there is none.
    pub fn fetch_data(&self, candidate: Option<&CandidateView>, source: &ValueSource) -> Value {
        match source {
            ValueSource::Field { field_name } => {
                let Some(candidate) = candidate else {
                    tracing::error!(field = %field_name, "cannot extract field without a candidate");
                    return Value::Null;
                };
                self.extract(candidate, field_name).unwrap_or_else(|err| {
                    tracing::error!(
                        field = %field_name,
                        candidate_number = candidate.candidate_number(),
                        error = %err,
                        "error extracting field from candidate"
                    );
                    Value::Null
                })
            }
            ValueSource::Property { property_name, .. } => candidate
                .and_then(|candidate| candidate.properties.get(property_name))
                .and_then(|value| value.clone())
                .map(Value::String)
                .unwrap_or(Value::Null),
            ValueSource::Constant { constant } => constant.clone(),
        }
    }

    /// Content of one cell. `expanding_count` 0 is the candidate's own row; higher
    /// counts are the expanded rows taken from `expanding_data`.
    pub fn build_cell(
        &self,
        candidate: Option<&CandidateView>,
        expanding_data: Option<&JsonRows>,
        expanding_count: usize,
        column: &ColumnDef,
    ) -> Value {
        let value_source = column.content.value.as_ref();
        let link_source = column.content.link.as_ref();

        let (value, link) = if expanding_count == 0 {
            let value = value_source
                .map(|source| self.fetch_data(candidate, source))
                .unwrap_or(Value::Null);
            if column.is_expanding() {
                let marker = if value.is_null() { "" } else { "..." };
                (Value::String(marker.into()), Value::Null)
            } else {
                let link = link_source
                    .map(|source| self.fetch_data(candidate, source))
                    .unwrap_or(Value::Null);
                (value, link)
            }
        } else {
            match expanding_data {
                Some(_) if column.is_expanding() => (Value::String(".".into()), Value::Null),
                Some(rows) => {
                    let index = expanding_count - 1;
                    let value = rows
                        .get(index, value_source.and_then(ValueSource::source_name))
                        .unwrap_or(Value::Null);
                    let link = rows
                        .get(index, link_source.and_then(ValueSource::source_name))
                        .unwrap_or(Value::Null);
                    (value, link)
                }
                None => (Value::Null, Value::Null),
            }
        };

        match (value, link) {
            (Value::Null, _) => Value::String(String::new()),
            (value, Value::Null) => value,
            (value, link) => Value::String(hyperlink(&link, &value)),
        }
    }

    pub fn build_row(
        &self,
        candidate: Option<&CandidateView>,
        expanding_data: Option<&JsonRows>,
        expanding_count: usize,
        columns: &[ColumnDef],
    ) -> Vec<Value> {
        columns
            .iter()
            .map(|column| self.build_cell(candidate, expanding_data, expanding_count, column))
            .collect()
    }

    pub fn build_title(&self, columns: &[ColumnDef]) -> Vec<Value> {
        columns
            .iter()
            .map(|column| Value::String(column.header.clone()))
            .collect()
    }

    /// Parse the candidate's value for `column` as expanding rows.
    pub fn load_expanding_data(
        &self,
        candidate: &CandidateView,
        column: Option<&ColumnDef>,
    ) -> Option<JsonRows> {
        let source = column?.content.value.as_ref()?;
        match self.fetch_data(Some(candidate), source) {
            Value::String(raw) => JsonRows::parse(&raw),
            _ => None,
        }
    }

    /// The candidate's own row plus one per expanded entry.
    pub fn compute_number_of_rows_by_candidate(
        &self,
        candidate: &CandidateView,
        expanding_column: Option<&ColumnDef>,
    ) -> usize {
        1 + self
            .load_expanding_data(candidate, expanding_column)
            .map_or(0, |rows| rows.len())
    }

    /// Title row followed by every candidate's rows.
    pub fn build_doc(&self, candidates: &[CandidateView], columns: &[ColumnDef]) -> Vec<Vec<Value>> {
        let expanding_column = find_expanding_column_def(columns);
        let mut doc = vec![self.build_title(columns)];
        for candidate in candidates {
            let expanding_data = self.load_expanding_data(candidate, expanding_column);
            let rows = self.compute_number_of_rows_by_candidate(candidate, expanding_column);
            for count in 0..rows {
                doc.push(self.build_row(Some(candidate), expanding_data.as_ref(), count, columns));
            }
        }
        doc
    }
}

/// The first expanding column, if any.
pub fn find_expanding_column_def(columns: &[ColumnDef]) -> Option<&ColumnDef> {
    columns.iter().find(|column| column.is_expanding())
}

fn hyperlink(link: &Value, value: &Value) -> String {
    let link = match link {
        Value::String(link) => link.clone(),
        other => other.to_string(),
    };
    let shown = match value {
        Value::String(text) => format!("\"{text}\""),
        other => other.to_string(),
    };
    format!("=HYPERLINK(\"{link}\",{shown})")
}

/// Load what [`CandidateView`] needs for each id, in the order given. Unknown ids are
/// skipped.
pub async fn load_candidate_views<C: ConnectionTrait>(
    conn: &C,
    candidate_ids: &[i64],
) -> TalentResult<Vec<CandidateView>> {
    if candidate_ids.is_empty() {
        return Ok(Vec::new());
    }
    let candidates = candidate::Entity::find()
        .filter(candidate::Column::Id.is_in(candidate_ids.to_vec()))
        .all(conn)
        .await?;

    let user_ids: Vec<i64> = candidates.iter().map(|c| c.user_id).collect();
    let mut users: BTreeMap<i64, users::Model> = users::Entity::find()
        .filter(users::Column::Id.is_in(user_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();

    let attachment_ids: Vec<i64> = candidates
        .iter()
        .flat_map(|c| [c.shareable_cv_attachment_id, c.shareable_doc_attachment_id])
        .flatten()
        .collect();
    let attachments: BTreeMap<i64, candidate_attachment::Model> = if attachment_ids.is_empty() {
        BTreeMap::new()
    } else {
        candidate_attachment::Entity::find()
            .filter(candidate_attachment::Column::Id.is_in(attachment_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|attachment| (attachment.id, attachment))
            .collect()
    };

    let mut properties: BTreeMap<i64, BTreeMap<String, Option<String>>> = BTreeMap::new();
    for property in candidate_property::Entity::find()
        .filter(candidate_property::Column::CandidateId.is_in(candidate_ids.to_vec()))
        .all(conn)
        .await?
    {
        properties
            .entry(property.candidate_id)
            .or_default()
            .insert(property.name, property.value);
    }

    let mut by_id: BTreeMap<i64, candidate::Model> =
        candidates.into_iter().map(|c| (c.id, c)).collect();
    let mut views = Vec::with_capacity(by_id.len());
    for id in candidate_ids {
        let Some(model) = by_id.remove(id) else {
            continue;
        };
        let lookup = |attachment_id: Option<i64>| {
            attachment_id.and_then(|attachment_id| attachments.get(&attachment_id).cloned())
        };
        let mut view = CandidateView::new(model);
        view.shareable_cv = lookup(view.candidate.shareable_cv_attachment_id);
        view.shareable_doc = lookup(view.candidate.shareable_doc_attachment_id);
        view.user = users.remove(&view.candidate.user_id);
        view.properties = properties.remove(id).unwrap_or_default();
        views.push(view);
    }
    Ok(views)
}

/// Single-candidate variant of [`load_candidate_views`].
pub async fn load_candidate_view<C: ConnectionTrait>(
    conn: &C,
    candidate_id: i64,
) -> TalentResult<CandidateView> {
    load_candidate_views(conn, &[candidate_id])
        .await?
        .pop()
        .ok_or_else(|| TalentError::not_found("candidate", candidate_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv_token::TokenError;
    use chrono::Utc;
    use entity::candidate::CandidateStatus;
    use entity::candidate_attachment::AttachmentType;
    use entity::{Status, users::Role};

    struct FixedToken;

    impl CandidateTokenProvider for FixedToken {
        fn generate_token(&self, candidate_number: &str, _valid_days: i64) -> Result<String, TokenError> {
            Ok(format!("token-{candidate_number}"))
        }
    }

    fn attachment(id: i64, location: &str) -> candidate_attachment::Model {
        candidate_attachment::Model {
            id,
            candidate_id: 1234,
            name: "cv.pdf".into(),
            location: location.into(),
            attachment_type: AttachmentType::Link,
            cv: true,
            created_date: Utc::now().into(),
        }
    }

    fn candidate_model() -> candidate::Model {
        candidate::Model {
            id: 1234,
            candidate_number: "1234".into(),
            user_id: 9,
            status: CandidateStatus::Active,
            gender: None,
            dob: None,
            phone: Some("+61 400 000 000".into()),
            whatsapp: None,
            nationality: Some("Syria".into()),
            country: Some("Lebanon".into()),
            city: None,
            address1: None,
            additional_info: None,
            candidate_message: None,
            linked_in_link: None,
            shareable_cv_attachment_id: Some(1),
            shareable_doc_attachment_id: None,
            avail_immediate: None,
            avail_immediate_notes: None,
            family_move: None,
            family_move_notes: None,
            int_recruit_reasons: None,
            left_home_reasons: None,
            home_location: None,
            residence_status: None,
            work_abroad: None,
            work_abroad_notes: None,
            host_entry_year: None,
            unhcr_status: None,
            unhcr_number: None,
            ielts_score: None,
            marital_status: None,
            number_dependants: Some(3),
            conflict: None,
            conflict_notes: None,
            crime_convict: None,
            crime_convict_notes: None,
            visa_reject: None,
            visa_reject_notes: None,
            driving_license: None,
            mini_intake_completed_date: None,
            full_intake_completed_date: None,
            created_date: Utc::now().into(),
            updated_date: None,
        }
    }

    fn view() -> CandidateView {
        let mut view = CandidateView::new(candidate_model());
        view.user = Some(users::Model {
            id: 9,
            username: "fred".into(),
            first_name: Some("fred".into()),
            last_name: Some("nurk with \n in the middle".into()),
            email: Some("fred@gmail.com".into()),
            role: Role::User,
            status: Status::Active,
            created_date: Utc::now().into(),
        });
        view.shareable_cv = Some(attachment(1, "https://candidateCVLink"));
        view.properties.insert(
            "dependants".into(),
            Some(
                r#"[
                {"user":"John","user.email":"john@gmail.com"},
                {"user":"Jane","candidateNumber":"87654","user.email":"jane@gmail.com"},
                {"user":"Jill","user.email":"jill@gmail.com"}
                ]"#
                .into(),
            ),
        );
        view
    }

    fn columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("id", "Candidate id").with_value(ValueSource::field("id")),
            ColumnDef::new("cn", "Candidate number")
                .with_value(ValueSource::field("candidateNumber"))
                .with_link(ValueSource::field("shareableCv.location")),
            ColumnDef::new("name", "Name").with_value(ValueSource::field("user")),
            ColumnDef::new("email", "Email").with_value(ValueSource::field("user.email")),
            ColumnDef::new("cv", "CV")
                .with_value(ValueSource::constant("cv"))
                .with_link(ValueSource::field("shareableCv.location")),
            ColumnDef::new("dependants", "Dependants")
                .with_value(ValueSource::property("dependants", PropertyType::Json)),
        ]
    }

    #[test]
    fn cells_without_expansion() {
        let builder = PublishedDocBuilder::new(&FixedToken);
        let view = view();
        let cols = columns();

        assert_eq!(builder.build_cell(Some(&view), None, 0, &cols[0]), Value::from(1234));
        assert_eq!(
            builder.build_cell(Some(&view), None, 0, &cols[2]),
            Value::from("fred nurk with \n in the middle")
        );
        assert_eq!(
            builder.build_cell(Some(&view), None, 0, &cols[1]),
            Value::from("=HYPERLINK(\"https://candidateCVLink\",1234)")
        );
        assert_eq!(
            builder.build_cell(Some(&view), None, 0, &cols[4]),
            Value::from("=HYPERLINK(\"https://candidateCVLink\",\"cv\")")
        );
        assert_eq!(builder.build_cell(Some(&view), None, 0, &cols[5]), Value::from("..."));
    }

    #[test]
    fn expanded_rows_read_json_entries() {
        let builder = PublishedDocBuilder::new(&FixedToken);
        let view = view();
        let cols = columns();
        let expanding = find_expanding_column_def(&cols);
        assert_eq!(expanding.map(|c| c.key.as_str()), Some("dependants"));
        let rows = builder.load_expanding_data(&view, expanding).unwrap();
        assert_eq!(rows.len(), 3);

        let row = builder.build_row(Some(&view), Some(&rows), 1, &cols);
        assert_eq!(row.len(), cols.len());
        assert_eq!(row[1], Value::from(""));
        assert_eq!(row[2], Value::from("John"));
        assert_eq!(row[3], Value::from("john@gmail.com"));
        assert_eq!(row[4], Value::from(""));
        assert_eq!(row[5], Value::from("."));

        let row = builder.build_row(Some(&view), Some(&rows), 2, &cols);
        assert_eq!(row[1], Value::from("87654"));
        assert_eq!(row[2], Value::from("Jane"));

        let row = builder.build_row(Some(&view), Some(&rows), 4, &cols);
        assert_eq!(row[1], Value::from(""));
        assert_eq!(row[2], Value::from(""));
    }

    #[test]
    fn number_of_rows_counts_expanded_entries() {
        let builder = PublishedDocBuilder::new(&FixedToken);
        let view = view();
        let cols = columns();
        assert_eq!(builder.compute_number_of_rows_by_candidate(&view, None), 1);
        assert_eq!(
            builder.compute_number_of_rows_by_candidate(&view, find_expanding_column_def(&cols)),
            4
        );

        let doc = builder.build_doc(&[view], &cols);
        assert_eq!(doc.len(), 5);
        assert_eq!(doc[0][0], Value::from("Candidate id"));
    }

    #[test]
    fn missing_expanding_property_shows_empty() {
        let builder = PublishedDocBuilder::new(&FixedToken);
        let mut view = view();
        view.properties.clear();
        let cols = columns();
        assert_eq!(builder.build_cell(Some(&view), None, 0, &cols[5]), Value::from(""));
        assert_eq!(builder.compute_number_of_rows_by_candidate(&view, Some(&cols[5])), 1);
    }

    #[test]
    fn field_post_processing() {
        let view = view();
        assert_eq!(view.extract_field("phone").unwrap(), Value::from("'+61 400 000 000"));
        assert_eq!(view.extract_field("whatsapp").unwrap(), Value::Null);
        assert_eq!(view.extract_field("status").unwrap(), Value::from("active"));
        assert_eq!(view.extract_field("shareableDoc.url").unwrap(), Value::Null);
        assert_eq!(view.extract_field("numberDependants").unwrap(), Value::from(3));
        assert_eq!(
            view.extract_field("nope"),
            Err(FieldError::Unknown("nope".into()))
        );
        assert!(view.extract_field("country.name").is_err());
    }

    #[test]
    fn cv_links_prefer_list_specific_attachments() {
        let builder = PublishedDocBuilder::new(&FixedToken).with_public_cv_base_url("https://cv/");
        let mut view = view();
        let smart = ValueSource::field("smartCvLink");
        let shareable = ValueSource::field("shareableCv.url");

        assert_eq!(
            builder.fetch_data(Some(&view), &smart),
            Value::from("https://candidateCVLink")
        );
        view.list_shareable_cv = Some(attachment(2, "https://listCv"));
        assert_eq!(builder.fetch_data(Some(&view), &smart), Value::from("https://listCv"));
        assert_eq!(builder.fetch_data(Some(&view), &shareable), Value::from("https://listCv"));

        view.list_shareable_cv = None;
        view.shareable_cv = None;
        assert_eq!(
            builder.fetch_data(Some(&view), &smart),
            Value::from("https://cv/token-1234")
        );
        assert_eq!(
            builder.fetch_data(Some(&view), &ValueSource::field("autoCvLink")),
            Value::from("https://cv/token-1234")
        );
    }

    #[test]
    fn field_without_candidate_degrades_to_empty() {
        let builder = PublishedDocBuilder::new(&FixedToken);
        let column = ColumnDef::new("id", "Id").with_value(ValueSource::field("id"));
        assert_eq!(builder.build_cell(None, None, 0, &column), Value::from(""));
        let constant = ColumnDef::new("c", "C").with_value(ValueSource::constant(5));
        assert_eq!(builder.build_cell(None, None, 0, &constant), Value::from(5));
    }

    #[test]
    fn column_defs_deserialize_from_json() {
        let column: ColumnDef = serde_json::from_value(serde_json::json!({
            "key": "dependants",
            "header": "Dependants",
            "content": {
                "value": {
                    "source": "property",
                    "propertyName": "dependants",
                    "propertyType": "JSON"
                }
            }
        }))
        .unwrap();
        assert!(column.is_expanding());
        assert_eq!(column.content.link, None);
    }
}

//! Saved lists and saved searches ("candidate sources").
//!
//! Sharing is two-sided: a source records the ids of the users it is shared with and
//! each [`User`] records the ids of the sources shared with them. The
//! [`CandidateSource`] methods are the only mutators and always update both sides.

use std::collections::{BTreeMap, BTreeSet};

use entity::salesforce_job_opp::Stage as JobStage;
use entity::{Status, export_column, saved_list, saved_search};
use serde_json::Value;

use crate::error::{TalentError, TalentResult};

/// Split a comma separated id list. `None` and blank strings decode to an empty set.
pub fn decode_watcher_ids(raw: Option<&str>) -> TalentResult<BTreeSet<i64>> {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return Ok(BTreeSet::new());
    };
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<i64>()
                .map_err(|_| TalentError::InvalidWatcherIds(raw.to_string()))
        })
        .collect()
}

/// Inverse of [`decode_watcher_ids`]; an empty set is stored as `None`.
pub fn encode_watcher_ids(ids: &BTreeSet<i64>) -> Option<String> {
    if ids.is_empty() {
        return None;
    }
    Some(
        ids.iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(","),
    )
}

pub fn decode_field_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

pub fn encode_field_list(fields: &[String]) -> Option<String> {
    (!fields.is_empty()).then(|| fields.join(","))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportColumnDef {
    pub key: String,
    pub index: i32,
    pub properties: Option<Value>,
}

impl From<export_column::Model> for ExportColumnDef {
    fn from(model: export_column::Model) -> Self {
        Self {
            key: model.key,
            index: model.index,
            properties: model.properties,
        }
    }
}

/// A login as seen from the sharing relation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    shared_lists: BTreeSet<i64>,
    shared_searches: BTreeSet<i64>,
}

impl User {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn shared_lists(&self) -> &BTreeSet<i64> {
        &self.shared_lists
    }

    pub fn shared_searches(&self) -> &BTreeSet<i64> {
        &self.shared_searches
    }
}

/// Users addressable by id, for operations that touch many of them.
#[derive(Clone, Debug, Default)]
pub struct UserDirectory {
    users: BTreeMap<i64, User>,
}

impl UserDirectory {
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: users.into_iter().map(|user| (user.id, user)).collect(),
        }
    }

    pub fn get(&self, id: i64) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn get_mut(&mut self, id: i64) -> Option<&mut User> {
        self.users.get_mut(&id)
    }

    pub fn insert(&mut self, user: User) {
        self.users.insert(user.id, user);
    }
}

/// Fields shared by saved lists and saved searches.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceCommon {
    pub id: i64,
    pub public_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: Status,
    fixed: bool,
    global: bool,
    watcher_ids: Option<String>,
    users: BTreeSet<i64>,
    pub displayed_fields_long: Vec<String>,
    pub displayed_fields_short: Vec<String>,
    export_columns: Vec<ExportColumnDef>,
    pub job_id: Option<i64>,
    pub created_by: i64,
}

impl SourceCommon {
    pub fn new(id: i64, name: impl Into<String>, created_by: i64) -> Self {
        Self {
            id,
            public_id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            status: Status::Active,
            fixed: false,
            global: false,
            watcher_ids: None,
            users: BTreeSet::new(),
            displayed_fields_long: Vec::new(),
            displayed_fields_short: Vec::new(),
            export_columns: Vec::new(),
            job_id: None,
            created_by,
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// `None` leaves the flag unchanged.
    pub fn set_fixed(&mut self, fixed: Option<bool>) {
        if let Some(fixed) = fixed {
            self.fixed = fixed;
        }
    }

    pub fn is_global(&self) -> bool {
        self.global
    }

    /// `None` leaves the flag unchanged.
    pub fn set_global(&mut self, global: Option<bool>) {
        if let Some(global) = global {
            self.global = global;
        }
    }

    pub fn watcher_ids_raw(&self) -> Option<&str> {
        self.watcher_ids.as_deref()
    }

    pub fn watcher_user_ids(&self) -> TalentResult<BTreeSet<i64>> {
        decode_watcher_ids(self.watcher_ids.as_deref())
    }

    pub fn set_watcher_user_ids(&mut self, ids: &BTreeSet<i64>) {
        self.watcher_ids = encode_watcher_ids(ids);
    }

    pub fn add_watcher(&mut self, user_id: i64) -> TalentResult<()> {
        let mut ids = self.watcher_user_ids()?;
        ids.insert(user_id);
        self.set_watcher_user_ids(&ids);
        Ok(())
    }

    pub fn remove_watcher(&mut self, user_id: i64) -> TalentResult<()> {
        let mut ids = self.watcher_user_ids()?;
        ids.remove(&user_id);
        self.set_watcher_user_ids(&ids);
        Ok(())
    }

    pub fn users(&self) -> &BTreeSet<i64> {
        &self.users
    }

    pub fn export_columns(&self) -> &[ExportColumnDef] {
        &self.export_columns
    }

    /// Replace the export columns, renumbering them `0..n` in the given order.
    pub fn set_export_columns(&mut self, columns: impl IntoIterator<Item = ExportColumnDef>) {
        self.export_columns = columns
            .into_iter()
            .enumerate()
            .map(|(index, mut column)| {
                column.index = index as i32;
                column
            })
            .collect();
    }

    /// Fixed sources may only be changed by their owner.
    pub fn can_be_modified_by(&self, user_id: i64) -> bool {
        !self.fixed || self.created_by == user_id
    }
}

/// Behavior shared by saved lists and saved searches.
pub trait CandidateSource {
    /// Entity name used in errors.
    const KIND: &'static str;

    fn common(&self) -> &SourceCommon;

    fn common_mut(&mut self) -> &mut SourceCommon;

    /// The user's side of the sharing relation for this kind of source.
    fn shares_of(user: &mut User) -> &mut BTreeSet<i64>;

    fn id(&self) -> i64 {
        self.common().id
    }

    fn ensure_modifiable(&self, user_id: i64) -> TalentResult<()> {
        if self.common().can_be_modified_by(user_id) {
            Ok(())
        } else {
            Err(TalentError::NotOwner {
                entity: Self::KIND,
                id: self.id(),
            })
        }
    }

    fn add_user(&mut self, user: &mut User) {
        let id = self.id();
        self.common_mut().users.insert(user.id);
        Self::shares_of(user).insert(id);
    }

    fn remove_user(&mut self, user: &mut User) {
        let id = self.id();
        self.common_mut().users.remove(&user.id);
        Self::shares_of(user).remove(&id);
    }

    /// Unshare from everyone, updating each former user's side.
    fn clear_users(&mut self, directory: &mut UserDirectory) {
        let id = self.id();
        let previous = std::mem::take(&mut self.common_mut().users);
        for user_id in previous {
            if let Some(user) = directory.get_mut(user_id) {
                Self::shares_of(user).remove(&id);
            }
        }
    }

    /// Share with exactly `user_ids`. Fails without changes if any id is unknown.
    fn set_users(&mut self, directory: &mut UserDirectory, user_ids: &[i64]) -> TalentResult<()> {
        if let Some(missing) = user_ids.iter().find(|id| directory.get(**id).is_none()) {
            return Err(TalentError::not_found("user", *missing));
        }
        self.clear_users(directory);
        for user_id in user_ids {
            if let Some(user) = directory.get_mut(*user_id) {
                self.add_user(user);
            }
        }
        Ok(())
    }
}

/// Summary of the job opportunity a list is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JobSummary {
    pub stage: JobStage,
    pub closed: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SavedList {
    pub common: SourceCommon,
    registered_job: bool,
    pub tbb_short_name: Option<String>,
    pub published_doc_link: Option<String>,
    pub folderlink: Option<String>,
    pub folderjdlink: Option<String>,
    pub file_jd_name: Option<String>,
    pub file_jd_link: Option<String>,
    /// Present when this is the selection list of a saved search.
    pub saved_search_id: Option<i64>,
    pub saved_search_source_id: Option<i64>,
    pub job: Option<JobSummary>,
}

impl SavedList {
    pub fn new(common: SourceCommon) -> Self {
        Self {
            common,
            registered_job: false,
            tbb_short_name: None,
            published_doc_link: None,
            folderlink: None,
            folderjdlink: None,
            file_jd_name: None,
            file_jd_link: None,
            saved_search_id: None,
            saved_search_source_id: None,
            job: None,
        }
    }

    pub fn from_model(
        model: saved_list::Model,
        users: impl IntoIterator<Item = i64>,
        export_columns: impl IntoIterator<Item = export_column::Model>,
        job: Option<JobSummary>,
    ) -> Self {
        let mut columns: Vec<export_column::Model> = export_columns.into_iter().collect();
        columns.sort_by_key(|column| column.index);
        let common = SourceCommon {
            id: model.id,
            public_id: model.public_id,
            name: model.name,
            description: model.description,
            status: model.status,
            fixed: model.fixed,
            global: model.global,
            watcher_ids: model.watcher_ids,
            users: users.into_iter().collect(),
            displayed_fields_long: decode_field_list(model.displayed_fields_long.as_deref()),
            displayed_fields_short: decode_field_list(model.displayed_fields_short.as_deref()),
            export_columns: columns.into_iter().map(ExportColumnDef::from).collect(),
            job_id: model.job_id,
            created_by: model.created_by,
        };
        Self {
            common,
            registered_job: model.registered_job,
            tbb_short_name: model.tbb_short_name,
            published_doc_link: model.published_doc_link,
            folderlink: model.folderlink,
            folderjdlink: model.folderjdlink,
            file_jd_name: model.file_jd_name,
            file_jd_link: model.file_jd_link,
            saved_search_id: model.saved_search_id,
            saved_search_source_id: model.saved_search_source_id,
            job,
        }
    }

    pub fn is_registered_job(&self) -> bool {
        self.registered_job
    }

    /// `None` leaves the flag unchanged.
    pub fn set_registered_job(&mut self, registered_job: Option<bool>) {
        if let Some(registered_job) = registered_job {
            self.registered_job = registered_job;
        }
    }

    pub fn is_selection_list(&self) -> bool {
        self.saved_search_id.is_some()
    }

    pub fn sf_job_stage(&self) -> Option<JobStage> {
        self.job.map(|job| job.stage)
    }

    pub fn sf_opp_is_closed(&self) -> bool {
        self.job.is_some_and(|job| job.closed)
    }
}

impl CandidateSource for SavedList {
    const KIND: &'static str = "saved list";

    fn common(&self) -> &SourceCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut SourceCommon {
        &mut self.common
    }

    fn shares_of(user: &mut User) -> &mut BTreeSet<i64> {
        &mut user.shared_lists
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SavedSearchType {
    Profession,
    Job,
    Other,
}

impl SavedSearchType {
    pub fn as_str(self) -> &'static str {
        match self {
            SavedSearchType::Profession => "profession",
            SavedSearchType::Job => "job",
            SavedSearchType::Other => "other",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "profession" => Some(Self::Profession),
            "job" => Some(Self::Job),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Split a stored `<type>` / `<type>/<subtype>` string. Unknown types yield `None`.
pub fn parse_search_type(raw: Option<&str>) -> (Option<SavedSearchType>, Option<String>) {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return (None, None);
    };
    let (kind, subtype) = match raw.split_once('/') {
        Some((kind, subtype)) => (kind, Some(subtype.to_string()).filter(|s| !s.is_empty())),
        None => (raw, None),
    };
    match SavedSearchType::parse(kind) {
        Some(kind) => (Some(kind), subtype),
        None => {
            tracing::warn!(value = raw, "ignoring unknown saved search type");
            (None, None)
        }
    }
}

pub fn format_search_type(kind: Option<SavedSearchType>, subtype: Option<&str>) -> Option<String> {
    let kind = kind?;
    Some(match subtype {
        Some(subtype) => format!("{}/{}", kind.as_str(), subtype),
        None => kind.as_str().to_string(),
    })
}

#[derive(Clone, Debug, PartialEq)]
pub struct SavedSearch {
    pub common: SourceCommon,
    pub search_type: Option<SavedSearchType>,
    pub search_subtype: Option<String>,
    default_search: bool,
    reviewable: bool,
    pub simple_query_string: Option<String>,
    pub keyword: Option<String>,
    pub statuses: Vec<String>,
    pub any_opps: Option<bool>,
    pub closed_opps: Option<bool>,
    pub relocated_opps: Option<bool>,
    pub exclusion_list_id: Option<i64>,
}

impl SavedSearch {
    pub fn new(common: SourceCommon) -> Self {
        Self {
            common,
            search_type: None,
            search_subtype: None,
            default_search: false,
            reviewable: false,
            simple_query_string: None,
            keyword: None,
            statuses: Vec::new(),
            any_opps: None,
            closed_opps: None,
            relocated_opps: None,
            exclusion_list_id: None,
        }
    }

    pub fn from_model(
        model: saved_search::Model,
        users: impl IntoIterator<Item = i64>,
        export_columns: impl IntoIterator<Item = export_column::Model>,
    ) -> Self {
        let mut columns: Vec<export_column::Model> = export_columns.into_iter().collect();
        columns.sort_by_key(|column| column.index);
        let (search_type, search_subtype) = parse_search_type(model.search_type.as_deref());
        let common = SourceCommon {
            id: model.id,
            public_id: model.public_id,
            name: model.name,
            description: model.description,
            status: model.status,
            fixed: model.fixed,
            global: model.global,
            watcher_ids: model.watcher_ids,
            users: users.into_iter().collect(),
            displayed_fields_long: decode_field_list(model.displayed_fields_long.as_deref()),
            displayed_fields_short: decode_field_list(model.displayed_fields_short.as_deref()),
            export_columns: columns.into_iter().map(ExportColumnDef::from).collect(),
            job_id: model.job_id,
            created_by: model.created_by,
        };
        Self {
            common,
            search_type,
            search_subtype,
            default_search: model.default_search,
            reviewable: model.reviewable,
            simple_query_string: model.simple_query_string,
            keyword: model.keyword,
            statuses: decode_field_list(model.statuses.as_deref()),
            any_opps: model.any_opps,
            closed_opps: model.closed_opps,
            relocated_opps: model.relocated_opps,
            exclusion_list_id: model.exclusion_list_id,
        }
    }

    pub fn type_string(&self) -> Option<String> {
        format_search_type(self.search_type, self.search_subtype.as_deref())
    }

    pub fn is_default_search(&self) -> bool {
        self.default_search
    }

    /// `None` leaves the flag unchanged.
    pub fn set_default_search(&mut self, default_search: Option<bool>) {
        if let Some(default_search) = default_search {
            self.default_search = default_search;
        }
    }

    pub fn is_reviewable(&self) -> bool {
        self.reviewable
    }

    /// `None` leaves the flag unchanged.
    pub fn set_reviewable(&mut self, reviewable: Option<bool>) {
        if let Some(reviewable) = reviewable {
            self.reviewable = reviewable;
        }
    }
}

impl CandidateSource for SavedSearch {
    const KIND: &'static str = "saved search";

    fn common(&self) -> &SourceCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut SourceCommon {
        &mut self.common
    }

    fn shares_of(user: &mut User) -> &mut BTreeSet<i64> {
        &mut user.shared_searches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(id: i64, owner: i64) -> SavedList {
        SavedList::new(SourceCommon::new(id, format!("list {id}"), owner))
    }

    fn search(id: i64, owner: i64) -> SavedSearch {
        SavedSearch::new(SourceCommon::new(id, format!("search {id}"), owner))
    }

    fn directory(ids: &[i64]) -> UserDirectory {
        UserDirectory::new(ids.iter().copied().map(User::new))
    }

    fn assert_in_sync(list: &SavedList, directory: &UserDirectory, ids: &[i64]) {
        for id in ids {
            let user = directory.get(*id).unwrap();
            assert_eq!(
                list.common.users().contains(id),
                user.shared_lists().contains(&list.id()),
                "user {id}"
            );
        }
    }

    #[test]
    fn add_and_remove_keep_both_sides_in_sync() {
        let ids = [1, 2, 3];
        let mut users = directory(&ids);
        let mut first = list(10, 1);

        first.add_user(users.get_mut(2).unwrap());
        first.add_user(users.get_mut(3).unwrap());
        first.add_user(users.get_mut(3).unwrap());
        assert_in_sync(&first, &users, &ids);
        assert_eq!(first.common.users().len(), 2);

        first.remove_user(users.get_mut(3).unwrap());
        first.remove_user(users.get_mut(1).unwrap());
        assert_in_sync(&first, &users, &ids);
        assert_eq!(users.get(2).unwrap().shared_lists(), &BTreeSet::from([10]));
        assert!(users.get(3).unwrap().shared_lists().is_empty());
    }

    #[test]
    fn set_users_replaces_previous_shares() {
        let ids = [1, 2, 3, 4];
        let mut users = directory(&ids);
        let mut shared = list(10, 1);
        shared.set_users(&mut users, &[1, 2]).unwrap();
        shared.set_users(&mut users, &[3, 4]).unwrap();

        assert_eq!(shared.common.users(), &BTreeSet::from([3, 4]));
        assert!(users.get(1).unwrap().shared_lists().is_empty());
        assert_in_sync(&shared, &users, &ids);
    }

    #[test]
    fn set_users_with_unknown_user_changes_nothing() {
        let mut users = directory(&[1, 2]);
        let mut shared = list(10, 1);
        shared.set_users(&mut users, &[1]).unwrap();

        let err = shared.set_users(&mut users, &[2, 9]).unwrap_err();
        assert!(matches!(err, TalentError::NotFound { entity: "user", id: 9 }));
        assert_eq!(shared.common.users(), &BTreeSet::from([1]));
        assert!(users.get(1).unwrap().shared_lists().contains(&10));
    }

    #[test]
    fn lists_and_searches_use_separate_collections() {
        let mut users = directory(&[5]);
        let mut shared_list = list(1, 5);
        let mut shared_search = search(1, 5);
        shared_list.add_user(users.get_mut(5).unwrap());
        shared_search.add_user(users.get_mut(5).unwrap());
        shared_search.clear_users(&mut users);

        let user = users.get(5).unwrap();
        assert_eq!(user.shared_lists(), &BTreeSet::from([1]));
        assert!(user.shared_searches().is_empty());
    }

    #[test]
    fn watcher_ids_encode_as_comma_list() {
        let mut source = list(1, 1);
        assert!(source.common.watcher_user_ids().unwrap().is_empty());

        source.common.add_watcher(42).unwrap();
        source.common.add_watcher(7).unwrap();
        source.common.add_watcher(42).unwrap();
        assert_eq!(source.common.watcher_ids_raw(), Some("7,42"));

        source.common.remove_watcher(7).unwrap();
        source.common.remove_watcher(42).unwrap();
        assert_eq!(source.common.watcher_ids_raw(), None);
    }

    #[test]
    fn watcher_ids_decode_is_inverse_of_encode() {
        let sets = [
            BTreeSet::from([1]),
            BTreeSet::from([3, 1, 2]),
            BTreeSet::from([9_007_199_254_740_993, 12]),
        ];
        for ids in sets {
            let mut source = list(1, 1);
            source.common.set_watcher_user_ids(&ids);
            assert_eq!(source.common.watcher_user_ids().unwrap(), ids);
        }
    }

    #[test]
    fn malformed_watcher_ids_are_an_error() {
        assert!(matches!(
            decode_watcher_ids(Some("1,,2")),
            Err(TalentError::InvalidWatcherIds(_))
        ));
        assert!(decode_watcher_ids(Some("1,abc")).is_err());
        assert!(decode_watcher_ids(Some("  ")).unwrap().is_empty());
        assert_eq!(decode_watcher_ids(Some(" 4, 5")).unwrap(), BTreeSet::from([4, 5]));
    }

    #[test]
    fn null_flag_setters_leave_values() {
        let mut source = search(1, 1);
        source.common.set_fixed(Some(true));
        source.common.set_fixed(None);
        source.common.set_global(None);
        source.set_reviewable(None);
        source.set_default_search(Some(true));
        assert!(source.common.is_fixed());
        assert!(!source.common.is_global());
        assert!(!source.is_reviewable());
        assert!(source.is_default_search());
    }

    #[test]
    fn fixed_sources_only_change_for_owner() {
        let mut source = list(3, 1);
        assert!(source.ensure_modifiable(2).is_ok());
        source.common.set_fixed(Some(true));
        assert!(source.ensure_modifiable(1).is_ok());
        let err = source.ensure_modifiable(2).unwrap_err();
        assert!(matches!(err, TalentError::NotOwner { entity: "saved list", id: 3 }));
    }

    #[test]
    fn export_columns_are_renumbered() {
        let mut source = list(1, 1);
        source.common.set_export_columns([
            ExportColumnDef { key: "name".into(), index: 7, properties: None },
            ExportColumnDef { key: "cv".into(), index: 7, properties: None },
            ExportColumnDef { key: "phone".into(), index: 0, properties: None },
        ]);
        let order: Vec<(&str, i32)> = source
            .common
            .export_columns()
            .iter()
            .map(|column| (column.key.as_str(), column.index))
            .collect();
        assert_eq!(order, vec![("name", 0), ("cv", 1), ("phone", 2)]);
    }

    #[test]
    fn search_type_strings() {
        assert_eq!(
            parse_search_type(Some("profession/nurse")),
            (Some(SavedSearchType::Profession), Some("nurse".to_string()))
        );
        assert_eq!(parse_search_type(Some("job")), (Some(SavedSearchType::Job), None));
        assert_eq!(parse_search_type(Some("banana/x")), (None, None));
        assert_eq!(parse_search_type(None), (None, None));
        assert_eq!(
            format_search_type(Some(SavedSearchType::Profession), Some("nurse")).as_deref(),
            Some("profession/nurse")
        );
    }

    #[test]
    fn list_job_derivations() {
        let mut plain = list(1, 1);
        assert!(!plain.sf_opp_is_closed());
        assert_eq!(plain.sf_job_stage(), None);
        plain.job = Some(JobSummary { stage: JobStage::TooLong, closed: true });
        assert!(plain.sf_opp_is_closed());
        assert_eq!(plain.sf_job_stage(), Some(JobStage::TooLong));
    }
}

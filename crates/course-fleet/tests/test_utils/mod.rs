//! Shared test utilities for integration tests
//!
//! In-memory EC2 and Route 53 providers that implement the same operation
//! traits as the real clients, plus a reporter that records the transcript.
//! Generic helpers (regions, course ids, roster files) are in
//! course-fleet-test-utils.

#![allow(dead_code)]

use anyhow::Result;
use course_fleet::aws::tags::{TAG_COURSE, TAG_NAME, course_tags};
use course_fleet::aws::{
    AwsError, ChangeAction, Ec2Operations, HostedZone, ImageSummary, InstanceSnapshot,
    LaunchInstanceConfig, LaunchedInstance, RecordChange, RecordSet, Route53Operations,
};
use course_fleet::config::{FleetConfig, ImageFilter, WaitTimeouts};
use course_fleet::workflow::{ProgressEvent, ProgressReporter};
use course_fleet_common::InstanceState;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

pub use course_fleet_test_utils::{SAMPLE_ROSTER, write_roster};

pub const DOMAIN: &str = "moraviancs.click";
pub const ZONE_ID: &str = "Z0COURSEFLEET";
pub const NEWEST_IMAGE: &str = "ami-0newest";

/// Fleet config pointed at the simulated cloud, polling every millisecond
pub fn fast_config() -> FleetConfig {
    FleetConfig {
        domain: DOMAIN.to_string(),
        wait: WaitTimeouts {
            running: Duration::from_secs(5),
            terminated: Duration::from_secs(5),
            initial_poll: Duration::from_millis(1),
            max_poll: Duration::from_millis(5),
        },
        ..FleetConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Transcript recording
// ---------------------------------------------------------------------------

/// Collects every transcript line a workflow would print
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Printed lines, with multi-line events split
    pub fn lines(&self) -> Vec<String> {
        self.events()
            .iter()
            .flat_map(|e| {
                e.to_string()
                    .lines()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn report(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// ---------------------------------------------------------------------------
// Simulated EC2
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SimInstance {
    pub instance_id: String,
    pub tags: BTreeMap<String, String>,
    pub state: InstanceState,
    pub public_ip: Option<String>,
    pub security_group_id: Option<String>,
    /// Address handed out once the instance is running
    address: Option<String>,
    /// Outcome of booting (Running unless a failure was injected)
    boot_outcome: InstanceState,
    polls: u32,
    hidden_polls: u32,
}

impl SimInstance {
    fn snapshot(&self) -> InstanceSnapshot {
        InstanceSnapshot {
            instance_id: self.instance_id.clone(),
            state: Some(self.state),
            state_reason: (self.state != InstanceState::Running
                && self.state != InstanceState::Pending)
                .then(|| "Client.UserInitiatedShutdown: simulated".to_string()),
            public_ip: self.public_ip.clone(),
            tags: self.tags.clone(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.tags.get(TAG_NAME).map(String::as_str)
    }
}

#[derive(Debug, Default)]
pub struct Ec2State {
    pub images: Vec<ImageSummary>,
    /// name -> id
    pub groups: BTreeMap<String, String>,
    pub group_tags: BTreeMap<String, String>,
    pub ingress: Vec<(String, Vec<u16>, String)>,
    pub deleted_groups: Vec<String>,
    pub launches: Vec<LaunchInstanceConfig>,
    pub instances: Vec<SimInstance>,
    pub terminate_calls: Vec<Vec<String>>,
    pub describe_calls: usize,

    boot_polls: u32,
    hidden_polls: u32,
    no_address: HashSet<String>,
    failing: HashMap<String, InstanceState>,
    fail_launch_at: Option<usize>,
    loose_tag_filter: bool,
    next_id: u32,
}

/// In-memory EC2 with deterministic ids and addresses
pub struct SimulatedEc2 {
    state: Mutex<Ec2State>,
}

impl Default for SimulatedEc2 {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedEc2 {
    pub fn new() -> Self {
        let images = vec![
            ImageSummary {
                image_id: "ami-0older".to_string(),
                creation_date: Some("2024-01-15T09:00:00.000Z".to_string()),
            },
            ImageSummary {
                image_id: NEWEST_IMAGE.to_string(),
                creation_date: Some("2024-09-03T17:45:00.000Z".to_string()),
            },
            ImageSummary {
                image_id: "ami-0middle".to_string(),
                creation_date: Some("2024-05-20T11:30:00.000Z".to_string()),
            },
        ];
        Self {
            state: Mutex::new(Ec2State {
                images,
                boot_polls: 1,
                ..Ec2State::default()
            }),
        }
    }

    fn configure(mut self, f: impl FnOnce(&mut Ec2State)) -> Self {
        f(self.state.get_mut().unwrap());
        self
    }

    pub fn with_images(self, images: Vec<ImageSummary>) -> Self {
        self.configure(|s| s.images = images)
    }

    /// Describe calls an instance stays pending for
    pub fn with_boot_polls(self, polls: u32) -> Self {
        self.configure(|s| s.boot_polls = polls)
    }

    /// Describe calls a new instance is invisible for (NotFound)
    pub fn with_hidden_polls(self, polls: u32) -> Self {
        self.configure(|s| s.hidden_polls = polls)
    }

    /// The instance launched for `name` never gets a public address
    pub fn without_address(self, name: &str) -> Self {
        let name = name.to_string();
        self.configure(|s| {
            s.no_address.insert(name);
        })
    }

    /// The instance launched for `name` ends up in `state` instead of running
    pub fn failing_boot(self, name: &str, state: InstanceState) -> Self {
        let name = name.to_string();
        self.configure(|s| {
            s.failing.insert(name, state);
        })
    }

    /// The n-th launch request (0-based) fails
    pub fn failing_launch_at(self, index: usize) -> Self {
        self.configure(|s| s.fail_launch_at = Some(index))
    }

    /// Tag queries return every instance, as if the server ignored the filter
    pub fn with_loose_tag_filter(self) -> Self {
        self.configure(|s| s.loose_tag_filter = true)
    }

    /// Add an already existing instance
    pub fn seed_instance(&self, course: &str, name: &str, state: InstanceState) -> String {
        let mut s = self.state.lock().unwrap();
        let id = next_instance_id(&mut s);
        let tags = course_tags(course, name)
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        s.instances.push(SimInstance {
            instance_id: id.clone(),
            tags,
            state,
            public_ip: (state == InstanceState::Running).then(|| address_for(&id)),
            security_group_id: None,
            address: Some(address_for(&id)),
            boot_outcome: InstanceState::Running,
            polls: 0,
            hidden_polls: 0,
        });
        id
    }

    /// Add an already existing security group
    pub fn seed_group(&self, name: &str, course: &str) -> String {
        let mut s = self.state.lock().unwrap();
        let id = format!("sg-{:017x}", s.groups.len() + 1);
        s.groups.insert(name.to_string(), id.clone());
        s.group_tags.insert(name.to_string(), course.to_string());
        id
    }

    pub fn with_state<T>(&self, f: impl FnOnce(&Ec2State) -> T) -> T {
        f(&self.state.lock().unwrap())
    }

    pub fn launches(&self) -> Vec<LaunchInstanceConfig> {
        self.with_state(|s| s.launches.clone())
    }

    pub fn instance(&self, instance_id: &str) -> Option<SimInstance> {
        self.with_state(|s| {
            s.instances
                .iter()
                .find(|i| i.instance_id == instance_id)
                .cloned()
        })
    }

    pub fn terminate_calls(&self) -> Vec<Vec<String>> {
        self.with_state(|s| s.terminate_calls.clone())
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.with_state(|s| s.groups.contains_key(name))
    }
}

fn next_instance_id(s: &mut Ec2State) -> String {
    s.next_id += 1;
    format!("i-{:017x}", s.next_id)
}

fn address_for(instance_id: &str) -> String {
    let n = u32::from_str_radix(instance_id.trim_start_matches("i-"), 16).unwrap_or(0);
    format!("54.210.{}.{}", n / 250, n % 250 + 1)
}

fn not_found(resource_type: &'static str, resource_id: &str) -> anyhow::Error {
    AwsError::NotFound {
        resource_type,
        resource_id: resource_id.to_string(),
    }
    .into()
}

impl Ec2Operations for SimulatedEc2 {
    async fn describe_images(&self, _filter: &ImageFilter) -> Result<Vec<ImageSummary>> {
        Ok(self.with_state(|s| s.images.clone()))
    }

    async fn create_security_group(
        &self,
        name: &str,
        _description: &str,
        course: &str,
    ) -> Result<String> {
        let mut s = self.state.lock().unwrap();
        if s.groups.contains_key(name) {
            return Err(AwsError::AlreadyExists {
                message: format!("The security group '{name}' already exists"),
            }
            .into());
        }
        let id = format!("sg-{:017x}", s.groups.len() + 1);
        s.groups.insert(name.to_string(), id.clone());
        s.group_tags.insert(name.to_string(), course.to_string());
        Ok(id)
    }

    async fn authorize_ingress(
        &self,
        security_group_id: &str,
        ports: &[u16],
        cidr: &str,
    ) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.ingress
            .push((security_group_id.to_string(), ports.to_vec(), cidr.to_string()));
        Ok(())
    }

    async fn delete_security_group(&self, name: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        if s.groups.remove(name).is_none() {
            return Err(not_found("security group", name));
        }
        s.group_tags.remove(name);
        s.deleted_groups.push(name.to_string());
        Ok(())
    }

    async fn launch_instance(&self, config: LaunchInstanceConfig) -> Result<LaunchedInstance> {
        let mut s = self.state.lock().unwrap();
        let index = s.launches.len();
        s.launches.push(config.clone());

        if s.fail_launch_at == Some(index) {
            return Err(AwsError::Sdk {
                code: Some("InsufficientInstanceCapacity".to_string()),
                message: "simulated capacity shortage".to_string(),
            }
            .into());
        }

        let id = next_instance_id(&mut s);
        let tags = course_tags(&config.course, &config.name)
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let boot_outcome = s
            .failing
            .get(&config.name)
            .copied()
            .unwrap_or(InstanceState::Running);
        let address = (!s.no_address.contains(&config.name)).then(|| address_for(&id));
        let hidden_polls = s.hidden_polls;

        s.instances.push(SimInstance {
            instance_id: id.clone(),
            tags,
            state: InstanceState::Pending,
            public_ip: None,
            security_group_id: Some(config.security_group_id.clone()),
            address,
            boot_outcome,
            polls: 0,
            hidden_polls,
        });

        Ok(LaunchedInstance { instance_id: id })
    }

    async fn describe_instances(&self, instance_ids: &[String]) -> Result<Vec<InstanceSnapshot>> {
        let mut s = self.state.lock().unwrap();
        s.describe_calls += 1;
        let boot_polls = s.boot_polls;

        let mut snapshots = Vec::new();
        for id in instance_ids {
            let Some(instance) = s.instances.iter_mut().find(|i| &i.instance_id == id) else {
                return Err(not_found("instance", id));
            };
            if instance.hidden_polls > 0 {
                instance.hidden_polls -= 1;
                return Err(not_found("instance", id));
            }

            instance.polls += 1;
            match instance.state {
                InstanceState::Pending if instance.polls > boot_polls => {
                    instance.state = instance.boot_outcome;
                    if instance.state == InstanceState::Running {
                        instance.public_ip = instance.address.clone();
                    }
                }
                InstanceState::ShuttingDown if instance.polls > boot_polls => {
                    instance.state = InstanceState::Terminated;
                    instance.public_ip = None;
                }
                _ => {}
            }
            snapshots.push(instance.snapshot());
        }
        Ok(snapshots)
    }

    async fn find_instances_by_tag(&self, key: &str, value: &str) -> Result<Vec<InstanceSnapshot>> {
        let s = self.state.lock().unwrap();
        Ok(s.instances
            .iter()
            .filter(|i| {
                s.loose_tag_filter
                    || (i.tags.get(key).map(String::as_str) == Some(value) && i.state.is_live())
            })
            .map(SimInstance::snapshot)
            .collect())
    }

    async fn terminate_instances(&self, instance_ids: &[String]) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.terminate_calls.push(instance_ids.to_vec());
        for id in instance_ids {
            let Some(instance) = s.instances.iter_mut().find(|i| &i.instance_id == id) else {
                return Err(not_found("instance", id));
            };
            if instance.state != InstanceState::Terminated {
                instance.state = InstanceState::ShuttingDown;
                instance.polls = 0;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Simulated Route 53
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Route53State {
    pub zones: Vec<HostedZone>,
    /// zone id -> record sets
    pub records: BTreeMap<String, Vec<RecordSet>>,
    /// every accepted batch, in order
    pub batches: Vec<(String, Vec<RecordChange>)>,
    pub change_calls: usize,
}

/// In-memory Route 53 with UPSERT/DELETE semantics and atomic batches
pub struct SimulatedRoute53 {
    state: Mutex<Route53State>,
}

impl Default for SimulatedRoute53 {
    fn default() -> Self {
        Self::new()
    }
}

fn fqdn(name: &str) -> String {
    format!("{}.", name.trim_end_matches('.').to_ascii_lowercase())
}

fn apex_records(zone_name: &str) -> Vec<RecordSet> {
    vec![
        RecordSet {
            name: zone_name.to_string(),
            record_type: "NS".to_string(),
            ttl: Some(172800),
            values: vec!["ns-1.awsdns-01.org.".to_string()],
            is_alias: false,
        },
        RecordSet {
            name: zone_name.to_string(),
            record_type: "SOA".to_string(),
            ttl: Some(900),
            values: vec!["ns-1.awsdns-01.org. hostmaster. 1 7200 900 1209600 86400".to_string()],
            is_alias: false,
        },
    ]
}

impl SimulatedRoute53 {
    /// A cloud with the course zone plus zones whose names only look similar
    pub fn new() -> Self {
        let zones = vec![
            HostedZone::new(&format!("/hostedzone/{ZONE_ID}"), format!("{DOMAIN}.")),
            HostedZone::new("/hostedzone/Z0SUFFIX", format!("{DOMAIN}.example.")),
            HostedZone::new("/hostedzone/Z0SUBZONE", format!("labs.{DOMAIN}.")),
        ];
        Self::with_zones(zones)
    }

    pub fn with_zones(zones: Vec<HostedZone>) -> Self {
        let records = zones
            .iter()
            .map(|z| (z.id.clone(), apex_records(&z.name)))
            .collect();
        Self {
            state: Mutex::new(Route53State {
                zones,
                records,
                ..Route53State::default()
            }),
        }
    }

    pub fn seed_record(&self, zone_id: &str, record: RecordSet) {
        let mut s = self.state.lock().unwrap();
        s.records.entry(zone_id.to_string()).or_default().push(record);
    }

    pub fn records(&self, zone_id: &str) -> Vec<RecordSet> {
        let s = self.state.lock().unwrap();
        s.records.get(zone_id).cloned().unwrap_or_default()
    }

    /// A records in the zone as (fqdn, value)
    pub fn a_records(&self, zone_id: &str) -> Vec<(String, String)> {
        self.records(zone_id)
            .into_iter()
            .filter(|r| r.record_type == "A" && !r.is_alias)
            .flat_map(|r| {
                let name = r.name.clone();
                r.values.into_iter().map(move |v| (name.clone(), v))
            })
            .collect()
    }

    pub fn change_calls(&self) -> usize {
        self.state.lock().unwrap().change_calls
    }

    pub fn batches(&self) -> Vec<(String, Vec<RecordChange>)> {
        self.state.lock().unwrap().batches.clone()
    }
}

impl Route53Operations for SimulatedRoute53 {
    async fn list_zones_by_name(&self, _dns_name: &str) -> Result<Vec<HostedZone>> {
        Ok(self.state.lock().unwrap().zones.clone())
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<RecordSet>> {
        let s = self.state.lock().unwrap();
        s.records
            .get(zone_id)
            .cloned()
            .ok_or_else(|| not_found("hosted zone", zone_id))
    }

    async fn change_records(&self, zone_id: &str, changes: Vec<RecordChange>) -> Result<String> {
        let mut s = self.state.lock().unwrap();
        s.change_calls += 1;

        if changes.is_empty() {
            return Err(AwsError::InvalidChangeBatch {
                message: "ChangeBatch must contain at least one change".to_string(),
            }
            .into());
        }
        let Some(existing) = s.records.get(zone_id) else {
            return Err(not_found("hosted zone", zone_id));
        };

        // Apply to a copy so a rejected batch changes nothing
        let mut updated = existing.clone();
        for change in &changes {
            let name = fqdn(&change.record.name);
            let position = updated
                .iter()
                .position(|r| fqdn(&r.name) == name && r.record_type == change.record.record_type);
            match change.action {
                ChangeAction::Upsert => {
                    let record = RecordSet {
                        name: name.clone(),
                        ..change.record.clone()
                    };
                    match position {
                        Some(i) => updated[i] = record,
                        None => updated.push(record),
                    }
                }
                ChangeAction::Delete => match position {
                    Some(i)
                        if updated[i].values == change.record.values
                            && updated[i].ttl == change.record.ttl =>
                    {
                        updated.remove(i);
                    }
                    _ => {
                        return Err(AwsError::InvalidChangeBatch {
                            message: format!(
                                "Tried to delete resource record set [name='{name}', type='{}'] but it was not found",
                                change.record.record_type
                            ),
                        }
                        .into());
                    }
                },
            }
        }

        s.records.insert(zone_id.to_string(), updated);
        s.batches.push((zone_id.to_string(), changes));
        Ok(format!("/change/C{:04}", s.batches.len()))
    }
}

/// Course instances as (name, state) in launch order
pub fn course_instances(ec2: &SimulatedEc2, course: &str) -> Vec<(String, InstanceState)> {
    ec2.with_state(|s| {
        s.instances
            .iter()
            .filter(|i| i.tags.get(TAG_COURSE).map(String::as_str) == Some(course))
            .map(|i| (i.name().unwrap_or_default().to_string(), i.state))
            .collect()
    })
}

//! StatefulSet builder
//!
//! Pod 0 is the primary; every other ordinal clones its data from the previous
//! peer with xtrabackup and then replicates from pod 0. The shell payloads below
//! run inside the containers and are opaque to the reconciler. Peer host names
//! are derived from the pod's own hostname (`<set>-<ordinal>`), which works
//! because the governing headless Service shares the StatefulSet's name.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{StatefulSet, StatefulSetSpec};
use k8s_openapi::api::core::v1::{
    ConfigMapVolumeSource, Container, ContainerPort, EmptyDirVolumeSource, EnvVar, ExecAction,
    PersistentVolumeClaim, PersistentVolumeClaimSpec, PodSpec, PodTemplateSpec, Probe,
    ResourceRequirements, Volume, VolumeMount, VolumeResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};

use super::{object_labels, selector_labels, MYSQL_PORT, XTRABACKUP_PORT};
use crate::ObjectKey;

/// Number of MySQL pods (one primary, one replica)
pub const REPLICAS: i32 = 2;

/// Storage requested by each pod's `data` volume claim
pub const DATA_VOLUME_SIZE: &str = "2Gi";

/// ConfigMap key copied into `conf.d` on the primary (ordinal 0)
pub const PRIMARY_CONFIG_KEY: &str = "master.cnf";

/// ConfigMap key copied into `conf.d` on every replica
pub const REPLICA_CONFIG_KEY: &str = "slave.cnf";

const MYSQL_IMAGE: &str = "mysql:5.7";
const XTRABACKUP_IMAGE: &str = "gcr.io/google-samples/xtrabackup:1.0";

const DATA_VOLUME: &str = "data";
const CONF_VOLUME: &str = "conf";
const CONFIG_MAP_VOLUME: &str = "config-map";

const MYSQL_DATA_DIR: &str = "/var/lib/mysql";
const MYSQL_CONF_DIR: &str = "/etc/mysql/conf.d";

const INIT_MYSQL_SCRIPT: &str = r#"set -ex
# Generate mysql server-id from pod ordinal index.
[[ `hostname` =~ -([0-9]+)$ ]] || exit 1
ordinal=${BASH_REMATCH[1]}
echo [mysqld] > /mnt/conf.d/server-id.cnf
# Add an offset to avoid reserved server-id=0 value.
echo server-id=$((100 + $ordinal)) >> /mnt/conf.d/server-id.cnf
# Copy appropriate conf.d files from config-map to emptyDir.
if [[ $ordinal -eq 0 ]]; then
  cp /mnt/config-map/master.cnf /mnt/conf.d/
else
  cp /mnt/config-map/slave.cnf /mnt/conf.d/
fi"#;

const CLONE_MYSQL_SCRIPT: &str = r#"set -ex
# Skip the clone if data already exists.
[[ -d /var/lib/mysql/mysql ]] && exit 0
# Skip the clone on the primary (ordinal index 0).
[[ `hostname` =~ ^(.+)-([0-9]+)$ ]] || exit 1
set_name=${BASH_REMATCH[1]}
ordinal=${BASH_REMATCH[2]}
[[ $ordinal -eq 0 ]] && exit 0
# Clone data from previous peer.
ncat --recv-only ${set_name}-$(($ordinal-1)).${set_name} 3307 | xbstream -x -C /var/lib/mysql
# Prepare the backup.
xtrabackup --prepare --target-dir=/var/lib/mysql"#;

const XTRABACKUP_SCRIPT: &str = r#"set -ex
cd /var/lib/mysql
[[ `hostname` =~ ^(.+)-([0-9]+)$ ]] || exit 1
set_name=${BASH_REMATCH[1]}

# Determine binlog position of cloned data, if any.
if [[ -f xtrabackup_slave_info && "x$(<xtrabackup_slave_info)" != "x" ]]; then
  # XtraBackup already generated a partial "CHANGE MASTER TO" query
  # because we're cloning from an existing replica. (Need to remove the tailing semicolon!)
  cat xtrabackup_slave_info | sed -E 's/;$//g' > change_master_to.sql.in
  # Ignore xtrabackup_binlog_info in this case (it's useless).
  rm -f xtrabackup_slave_info xtrabackup_binlog_info
elif [[ -f xtrabackup_binlog_info ]]; then
  # We're cloning directly from the primary. Parse binlog position.
  [[ `cat xtrabackup_binlog_info` =~ ^(.*?)[[:space:]]+(.*?)$ ]] || exit 1
  rm -f xtrabackup_binlog_info xtrabackup_slave_info
  echo "CHANGE MASTER TO MASTER_LOG_FILE='${BASH_REMATCH[1]}', MASTER_LOG_POS=${BASH_REMATCH[2]}" > change_master_to.sql.in
fi

# Check if we need to complete a clone by starting replication.
if [[ -f change_master_to.sql.in ]]; then
  echo "Waiting for mysqld to be ready (accepting connections)"
  until mysql -h 127.0.0.1 -e "SELECT 1"; do sleep 1; done

  echo "Initializing replication from clone position"
  mysql -h 127.0.0.1 \
-e "$(<change_master_to.sql.in), \
MASTER_HOST='${set_name}-0.${set_name}', \
MASTER_USER='root', \
MASTER_PASSWORD='', \
MASTER_CONNECT_RETRY=10; \
START SLAVE;" || exit 1
  # In case of container restart, attempt this at-most-once.
  mv change_master_to.sql.in change_master_to.sql.orig
fi

# Start a server to send backups when requested by peers.
exec ncat --listen --keep-open --send-only --max-conns=1 3307 -c "xtrabackup --backup --slave-info --stream=xbstream --host=127.0.0.1 --user=root""#;

/// Build the MySQL StatefulSet for the cluster `owner`.
///
/// The StatefulSet is named after the owner and governed by the headless
/// Service of the same name. The per-instance `mysql.cnf` files come from the
/// prerequisite ConfigMap, which also shares the owner's name.
pub fn build_statefulset(owner: &ObjectKey) -> StatefulSet {
    StatefulSet {
        metadata: ObjectMeta {
            name: Some(owner.name.clone()),
            namespace: Some(owner.namespace.clone()),
            labels: Some(object_labels(&owner.name)),
            ..Default::default()
        },
        spec: Some(StatefulSetSpec {
            replicas: Some(REPLICAS),
            service_name: Some(owner.name.clone()),
            selector: LabelSelector {
                match_labels: Some(selector_labels(&owner.name)),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(selector_labels(&owner.name)),
                    ..Default::default()
                }),
                spec: Some(pod_spec(&owner.name)),
            },
            volume_claim_templates: Some(vec![data_claim_template()]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn pod_spec(config_map_name: &str) -> PodSpec {
    PodSpec {
        init_containers: Some(vec![init_mysql_container(), clone_mysql_container()]),
        containers: vec![mysql_container(), xtrabackup_container()],
        volumes: Some(vec![
            Volume {
                name: CONF_VOLUME.to_string(),
                empty_dir: Some(EmptyDirVolumeSource::default()),
                ..Default::default()
            },
            Volume {
                name: CONFIG_MAP_VOLUME.to_string(),
                config_map: Some(ConfigMapVolumeSource {
                    name: config_map_name.to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            },
        ]),
        ..Default::default()
    }
}

fn init_mysql_container() -> Container {
    Container {
        name: "init-mysql".to_string(),
        image: Some(MYSQL_IMAGE.to_string()),
        command: Some(bash(INIT_MYSQL_SCRIPT)),
        volume_mounts: Some(vec![
            mount(CONF_VOLUME, "/mnt/conf.d", None),
            mount(CONFIG_MAP_VOLUME, "/mnt/config-map", None),
        ]),
        ..Default::default()
    }
}

fn clone_mysql_container() -> Container {
    Container {
        name: "clone-mysql".to_string(),
        image: Some(XTRABACKUP_IMAGE.to_string()),
        command: Some(bash(CLONE_MYSQL_SCRIPT)),
        volume_mounts: Some(data_and_conf_mounts()),
        ..Default::default()
    }
}

fn mysql_container() -> Container {
    Container {
        name: "mysql".to_string(),
        image: Some(MYSQL_IMAGE.to_string()),
        env: Some(vec![EnvVar {
            name: "MYSQL_ALLOW_EMPTY_PASSWORD".to_string(),
            value: Some("1".to_string()),
            ..Default::default()
        }]),
        ports: Some(vec![ContainerPort {
            name: Some("mysql".to_string()),
            container_port: MYSQL_PORT,
            ..Default::default()
        }]),
        resources: Some(requests("500m", "1Gi")),
        volume_mounts: Some(data_and_conf_mounts()),
        liveness_probe: Some(exec_probe(&["mysqladmin", "ping"], 30, 5, 10)),
        readiness_probe: Some(exec_probe(
            &["mysql", "-h", "127.0.0.1", "-e", "SELECT 1"],
            5,
            1,
            2,
        )),
        ..Default::default()
    }
}

fn xtrabackup_container() -> Container {
    Container {
        name: "xtrabackup".to_string(),
        image: Some(XTRABACKUP_IMAGE.to_string()),
        command: Some(bash(XTRABACKUP_SCRIPT)),
        ports: Some(vec![ContainerPort {
            name: Some("xtrabackup".to_string()),
            container_port: XTRABACKUP_PORT,
            ..Default::default()
        }]),
        resources: Some(requests("100m", "100Mi")),
        volume_mounts: Some(data_and_conf_mounts()),
        ..Default::default()
    }
}

fn data_claim_template() -> PersistentVolumeClaim {
    PersistentVolumeClaim {
        metadata: ObjectMeta {
            name: Some(DATA_VOLUME.to_string()),
            ..Default::default()
        },
        spec: Some(PersistentVolumeClaimSpec {
            access_modes: Some(vec!["ReadWriteOnce".to_string()]),
            resources: Some(VolumeResourceRequirements {
                requests: Some(BTreeMap::from([(
                    "storage".to_string(),
                    Quantity(DATA_VOLUME_SIZE.to_string()),
                )])),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn bash(script: &str) -> Vec<String> {
    vec!["bash".to_string(), "-c".to_string(), script.to_string()]
}

fn mount(volume: &str, path: &str, sub_path: Option<&str>) -> VolumeMount {
    VolumeMount {
        name: volume.to_string(),
        mount_path: path.to_string(),
        sub_path: sub_path.map(str::to_string),
        ..Default::default()
    }
}

fn data_and_conf_mounts() -> Vec<VolumeMount> {
    vec![
        mount(DATA_VOLUME, MYSQL_DATA_DIR, Some("mysql")),
        mount(CONF_VOLUME, MYSQL_CONF_DIR, None),
    ]
}

fn requests(cpu: &str, memory: &str) -> ResourceRequirements {
    ResourceRequirements {
        requests: Some(BTreeMap::from([
            ("cpu".to_string(), Quantity(cpu.to_string())),
            ("memory".to_string(), Quantity(memory.to_string())),
        ])),
        ..Default::default()
    }
}

fn exec_probe(command: &[&str], initial_delay: i32, timeout: i32, period: i32) -> Probe {
    Probe {
        exec: Some(ExecAction {
            command: Some(command.iter().map(|s| s.to_string()).collect()),
        }),
        initial_delay_seconds: Some(initial_delay),
        timeout_seconds: Some(timeout),
        period_seconds: Some(period),
        ..Default::default()
    }
}

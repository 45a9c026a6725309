use scara_jog::checkpoint_csv::{export_checkpoints, import_checkpoints};
use scara_jog::checkpoints::CheckpointStore;
use scara_jog::error::ErrorKind;
use scara_jog::serial_link::{format_command, SerialLink, DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT};

fn values(v: [&str; 5]) -> [String; 5] {
    v.map(String::from)
}

#[test]
fn save_export_import_in_fresh_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");

    let mut store = CheckpointStore::new();
    store.save(values(["1", "2", "3", "4", "5"]));
    store.save(values(["10", "20", "30", "40", "50"]));
    assert_eq!(store.count(), 2);
    export_checkpoints(&path, store.as_slice()).unwrap();
    drop(store);

    let mut reloaded = CheckpointStore::new();
    reloaded.replace_all(import_checkpoints(&path).unwrap());
    assert_eq!(reloaded.count(), 2);
    let numbers: Vec<[f64; 5]> = reloaded.iter().map(|c| c.numeric().unwrap()).collect();
    assert_eq!(numbers, vec![[1.0, 2.0, 3.0, 4.0, 5.0], [10.0, 20.0, 30.0, 40.0, 50.0]]);

    // Imported values go back out in float form
    assert_eq!(format_command(&reloaded.as_slice()[1]), "10.0,20.0,30.0,40.0,50.0\n");
}

#[test]
fn non_numeric_import_leaves_store_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    std::fs::write(&path, "1,2,3,4,5\n6,7,8,nine,10\n").unwrap();

    let mut store = CheckpointStore::new();
    store.save(values(["a", "b", "c", "d", "e"]));
    match import_checkpoints(&path) {
        Ok(list) => store.replace_all(list),
        Err(e) => assert_eq!(e.kind(), ErrorKind::File),
    }
    assert_eq!(store.count(), 1);
    assert_eq!(store.as_slice()[0].values()[0], "a");
}

#[test]
fn send_to_missing_port_leaves_store_unchanged() {
    let mut store = CheckpointStore::new();
    store.save(values(["1", "2", "3", "4", "5"]));
    let link = SerialLink::new("/dev/scara-jog-no-such-port", DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT);
    let err = link.send_one(&store.as_slice()[0]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serial);
    let err = link.send_all(store.as_slice()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serial);
    assert_eq!(store.count(), 1);
}

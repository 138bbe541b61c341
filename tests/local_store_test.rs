use drive_shuttle::config::TransferConfig;
use drive_shuttle::infrastructure::store::setup_store;
use drive_shuttle::services::transfer::TransferService;
use std::fs;

#[tokio::test]
async fn test_local_backend_folder_and_file_flow() {
    let tmp = tempfile::tempdir().unwrap();
    let config = TransferConfig::local(tmp.path());
    let store = setup_store(&config).unwrap();
    assert_eq!(store.provider_id(), "local");
    let service = TransferService::new(store, config);

    let folder = tmp.path().join("experiment");
    fs::create_dir_all(folder.join("plots")).unwrap();
    fs::write(folder.join("config.yaml"), b"lr: 0.1\n").unwrap();
    fs::write(folder.join("plots/loss.csv"), b"0,1.0\n1,0.5\n").unwrap();

    let remote = service.upload_folder(&folder).await.unwrap();
    assert_eq!(remote.name, "experiment.zip");
    assert!(tmp.path().join("store").join(&remote.id).join("experiment.zip").exists());

    let out = service
        .download_folder(&remote.id, Some("experiment.zip"))
        .await
        .unwrap();
    assert_eq!(out, tmp.path().join("scratch").join("0"));
    assert_eq!(fs::read(out.join("config.yaml")).unwrap(), b"lr: 0.1\n");
    assert_eq!(
        fs::read(out.join("plots/loss.csv")).unwrap(),
        b"0,1.0\n1,0.5\n"
    );

    let file = tmp.path().join("summary.txt");
    fs::write(&file, b"done").unwrap();
    let remote = service.upload_file(&file, true).await.unwrap();

    let restored = service
        .download_file(&remote.id, Some("fetched/summary.txt.zip"), true)
        .await
        .unwrap();
    assert_eq!(restored, tmp.path().join("scratch").join("summary.txt"));
    assert_eq!(fs::read(&restored).unwrap(), b"done");
    assert!(!tmp.path().join("fetched/summary.txt.zip").exists());
}

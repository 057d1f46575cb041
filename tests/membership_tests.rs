mod common;

use larder::LarderError;
use larder::membership::MembershipResolver;

#[tokio::test]
async fn group_names_are_required_and_unique() {
    let t = common::spawn("groups-names").await;
    let groups = &t.larder.groups;

    let err = groups.create_group("   ").await.unwrap_err();
    assert!(matches!(err, LarderError::Validation(_)), "got {err:?}");

    groups.create_group("cooks").await.unwrap();
    let err = groups.create_group("cooks").await.unwrap_err();
    assert!(matches!(err, LarderError::Validation(_)), "got {err:?}");

    // Case-sensitive.
    groups.create_group("Cooks").await.unwrap();

    t.cleanup().await;
}

#[tokio::test]
async fn expansion_reflects_current_members() {
    let t = common::spawn("groups-expand").await;
    let fanny = t.person("Fanny").await;
    let hank = t.person("Hank").await;
    let groups = &t.larder.groups;

    let cooks = groups.create_group("cooks").await.unwrap();
    assert!(groups.expand_group(cooks.id).await.unwrap().is_empty());

    groups.add_member(cooks.id, fanny.id).await.unwrap();
    groups.add_member(cooks.id, hank.id).await.unwrap();
    let members: Vec<_> = groups.expand_group(cooks.id).await.unwrap().into_iter().collect();
    let mut expected = vec![fanny.id, hank.id];
    expected.sort_unstable();
    assert_eq!(members, expected);

    assert!(groups.remove_member(cooks.id, fanny.id).await.unwrap());
    assert!(!groups.remove_member(cooks.id, fanny.id).await.unwrap());
    let members: Vec<_> = groups.expand_group(cooks.id).await.unwrap().into_iter().collect();
    assert_eq!(members, vec![hank.id]);

    let err = groups.expand_group(cooks.id + 100).await.unwrap_err();
    assert!(matches!(err, LarderError::NotFound(_)), "got {err:?}");

    t.cleanup().await;
}

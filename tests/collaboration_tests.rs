mod common;

use larder::LarderError;
use larder::membership::MembershipResolver;
use larder::types::ResourceKind;
use larder_schema::{CandidateQuery, CollaboratorRequest, ResourceRef};

fn request(resource: ResourceRef, person_ids: Vec<i64>, group_ids: Vec<i64>) -> CollaboratorRequest {
    CollaboratorRequest {
        resource,
        person_ids,
        group_ids,
    }
}

#[tokio::test]
async fn owner_adds_collaborator_and_queues_one_notification() {
    let mut t = common::spawn("collab-add").await;
    let fanny = t.person("Fanny").await;
    let hank = t.person("Hank").await;
    let package = t
        .larder
        .collaboration
        .create_resource(ResourceKind::Package, "redis", fanny.id)
        .await
        .unwrap();

    let created = t
        .larder
        .collaboration
        .create_collaborators(fanny.id, &request(package.reference(), vec![hank.id], vec![]))
        .await
        .unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].person_id, hank.id);
    assert_eq!(created[0].resource_ref(), package.reference());

    let events = t.queued_notifications();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].collaborator_person_id, hank.id);
    assert_eq!(events[0].owner_person_id, fanny.id);
    assert_eq!(events[0].resource, package.reference());

    let found = t
        .larder
        .collaboration
        .collaborator_for(hank.id, &package.reference())
        .await
        .unwrap();
    assert_eq!(found.map(|c| c.id), Some(created[0].id));

    t.cleanup().await;
}

#[tokio::test]
async fn non_owner_cannot_add_collaborators() {
    let mut t = common::spawn("collab-forbidden").await;
    let fanny = t.person("Fanny").await;
    let hanky = t.person("Hanky").await;
    let jim = t.person("Jim").await;
    let package = t
        .larder
        .collaboration
        .create_resource(ResourceKind::Package, "redis", fanny.id)
        .await
        .unwrap();

    let err = t
        .larder
        .collaboration
        .create_collaborators(hanky.id, &request(package.reference(), vec![jim.id], vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, LarderError::Forbidden(_)), "got {err:?}");

    let rows = t
        .larder
        .collaboration
        .collaborators(&package.reference())
        .await
        .unwrap();
    assert!(rows.is_empty());
    assert!(t.queued_notifications().is_empty());

    t.cleanup().await;
}

#[tokio::test]
async fn owner_is_never_added_and_resubmission_is_a_noop() {
    let mut t = common::spawn("collab-idempotent").await;
    let fanny = t.person("Fanny").await;
    let hank = t.person("Hank").await;
    let tool = t
        .larder
        .collaboration
        .create_resource(ResourceKind::Tool, "knife", fanny.id)
        .await
        .unwrap();

    let created = t
        .larder
        .collaboration
        .create_collaborators(fanny.id, &request(tool.reference(), vec![fanny.id], vec![]))
        .await
        .unwrap();
    assert!(created.is_empty());

    let first = t
        .larder
        .collaboration
        .create_collaborators(
            fanny.id,
            &request(tool.reference(), vec![hank.id, hank.id], vec![]),
        )
        .await
        .unwrap();
    assert_eq!(first.len(), 1);

    let again = t
        .larder
        .collaboration
        .create_collaborators(fanny.id, &request(tool.reference(), vec![hank.id], vec![]))
        .await
        .unwrap();
    assert!(again.is_empty());

    let rows = t
        .larder
        .collaboration
        .collaborators(&tool.reference())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(t.queued_notifications().len(), 1);

    t.cleanup().await;
}

#[tokio::test]
async fn unknown_resource_kind_is_not_found() {
    let t = common::spawn("collab-kind").await;
    let fanny = t.person("Fanny").await;
    let hank = t.person("Hank").await;
    let package = t
        .larder
        .collaboration
        .create_resource(ResourceKind::Package, "redis", fanny.id)
        .await
        .unwrap();

    let err = t
        .larder
        .collaboration
        .create_collaborators(
            fanny.id,
            &request(ResourceRef::new("Butter", package.id), vec![hank.id], vec![]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LarderError::NotFound(_)), "got {err:?}");

    let err = t
        .larder
        .collaboration
        .resource(&ResourceRef::new("Package", package.id + 100))
        .await
        .unwrap_err();
    assert!(matches!(err, LarderError::NotFound(_)), "got {err:?}");

    t.cleanup().await;
}

#[tokio::test]
async fn groups_expand_into_deduplicated_collaborators() {
    let mut t = common::spawn("collab-groups").await;
    let fanny = t.person("Fanny").await;
    let hank = t.person("Hank").await;
    let jim = t.person("Jim").await;
    let jam = t.person("Jam").await;
    let package = t
        .larder
        .collaboration
        .create_resource(ResourceKind::Package, "redis", fanny.id)
        .await
        .unwrap();

    let cooks = t.larder.groups.create_group("cooks").await.unwrap();
    let bakers = t.larder.groups.create_group("bakers").await.unwrap();
    for person in [fanny.id, hank.id, jim.id] {
        t.larder.groups.add_member(cooks.id, person).await.unwrap();
    }
    t.larder.groups.add_member(bakers.id, jim.id).await.unwrap();
    t.larder.groups.add_member(bakers.id, jim.id).await.unwrap();

    let expanded = t.larder.groups.expand_group(bakers.id).await.unwrap();
    assert_eq!(expanded.into_iter().collect::<Vec<_>>(), vec![jim.id]);

    let created = t
        .larder
        .collaboration
        .create_collaborators(
            fanny.id,
            &request(package.reference(), vec![jam.id, hank.id], vec![cooks.id, bakers.id]),
        )
        .await
        .unwrap();

    let mut people: Vec<_> = created.iter().map(|c| c.person_id).collect();
    people.sort_unstable();
    let mut expected = vec![hank.id, jim.id, jam.id];
    expected.sort_unstable();
    assert_eq!(people, expected);
    assert_eq!(t.queued_notifications().len(), 3);

    t.cleanup().await;
}

#[tokio::test]
async fn unknown_group_or_person_creates_nothing() {
    let mut t = common::spawn("collab-atomic").await;
    let fanny = t.person("Fanny").await;
    let hank = t.person("Hank").await;
    let package = t
        .larder
        .collaboration
        .create_resource(ResourceKind::Package, "redis", fanny.id)
        .await
        .unwrap();

    let err = t
        .larder
        .collaboration
        .create_collaborators(fanny.id, &request(package.reference(), vec![hank.id], vec![999]))
        .await
        .unwrap_err();
    assert!(matches!(err, LarderError::NotFound(_)), "got {err:?}");

    let err = t
        .larder
        .collaboration
        .create_collaborators(
            fanny.id,
            &request(package.reference(), vec![hank.id, 4242], vec![]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LarderError::NotFound(_)), "got {err:?}");

    let rows = t
        .larder
        .collaboration
        .collaborators(&package.reference())
        .await
        .unwrap();
    assert!(rows.is_empty());
    assert!(t.queued_notifications().is_empty());

    t.cleanup().await;
}

#[tokio::test]
async fn removal_is_allowed_for_owner_and_self_only() {
    let t = common::spawn("collab-remove").await;
    let fanny = t.person("Fanny").await;
    let hank = t.person("Hank").await;
    let jim = t.person("Jim").await;
    let package = t
        .larder
        .collaboration
        .create_resource(ResourceKind::Package, "redis", fanny.id)
        .await
        .unwrap();
    let created = t
        .larder
        .collaboration
        .create_collaborators(fanny.id, &request(package.reference(), vec![hank.id, jim.id], vec![]))
        .await
        .unwrap();
    let hank_row = created.iter().find(|c| c.person_id == hank.id).unwrap().id;
    let jim_row = created.iter().find(|c| c.person_id == jim.id).unwrap().id;

    let err = t
        .larder
        .collaboration
        .remove_collaborator(jim.id, hank_row)
        .await
        .unwrap_err();
    assert!(matches!(err, LarderError::Forbidden(_)), "got {err:?}");

    t.larder
        .collaboration
        .remove_collaborator(hank.id, hank_row)
        .await
        .unwrap();
    t.larder
        .collaboration
        .remove_collaborator(fanny.id, jim_row)
        .await
        .unwrap();

    let err = t
        .larder
        .collaboration
        .collaborator(hank_row)
        .await
        .unwrap_err();
    assert!(matches!(err, LarderError::NotFound(_)), "got {err:?}");
    assert!(
        t.larder
            .collaboration
            .collaborators(&package.reference())
            .await
            .unwrap()
            .is_empty()
    );

    t.cleanup().await;
}

#[tokio::test]
async fn transfer_moves_ownership_and_revokes_the_previous_owner() {
    let t = common::spawn("collab-transfer").await;
    let fanny = t.person("Fanny").await;
    let hank = t.person("Hank").await;
    let jim = t.person("Jim").await;
    let package = t
        .larder
        .collaboration
        .create_resource(ResourceKind::Package, "redis", fanny.id)
        .await
        .unwrap();
    let created = t
        .larder
        .collaboration
        .create_collaborators(fanny.id, &request(package.reference(), vec![hank.id, jim.id], vec![]))
        .await
        .unwrap();
    let hank_row = created.iter().find(|c| c.person_id == hank.id).unwrap().id;
    let jim_row = created.iter().find(|c| c.person_id == jim.id).unwrap().id;

    let err = t
        .larder
        .collaboration
        .transfer_ownership(jim.id, hank_row)
        .await
        .unwrap_err();
    assert!(matches!(err, LarderError::Forbidden(_)), "got {err:?}");

    let updated = t
        .larder
        .collaboration
        .transfer_ownership(fanny.id, hank_row)
        .await
        .unwrap();
    assert_eq!(updated.owner_id, hank.id);

    let reloaded = t
        .larder
        .collaboration
        .resource(&package.reference())
        .await
        .unwrap();
    assert_eq!(reloaded.owner_id, hank.id);

    assert!(
        t.larder
            .collaboration
            .collaborator_for(hank.id, &package.reference())
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        t.larder
            .collaboration
            .collaborator_for(fanny.id, &package.reference())
            .await
            .unwrap()
            .is_none()
    );

    let err = t
        .larder
        .collaboration
        .transfer_ownership(fanny.id, jim_row)
        .await
        .unwrap_err();
    assert!(matches!(err, LarderError::Forbidden(_)), "got {err:?}");

    let err = t
        .larder
        .collaboration
        .transfer_ownership(fanny.id, hank_row)
        .await
        .unwrap_err();
    assert!(matches!(err, LarderError::NotFound(_)), "got {err:?}");

    t.cleanup().await;
}

#[tokio::test]
async fn candidates_exclude_owner_and_listed_people() {
    let t = common::spawn("collab-candidates").await;
    let hank_sr = t.person("Hank Senior").await;
    let hank = t.person("Hank").await;
    let hanky = t.person("Hanky").await;
    let jim = t.person("Jim").await;
    let package = t
        .larder
        .collaboration
        .create_resource(ResourceKind::Package, "redis", hank_sr.id)
        .await
        .unwrap();

    let candidates = t
        .larder
        .collaboration
        .list_candidates(
            &package.reference(),
            &CandidateQuery {
                query: "hank".to_string(),
                excluded_person_ids: vec![],
            },
        )
        .await
        .unwrap();
    let ids: Vec<_> = candidates.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![hank.id, hanky.id]);

    let candidates = t
        .larder
        .collaboration
        .list_candidates(
            &package.reference(),
            &CandidateQuery {
                query: "hank".to_string(),
                excluded_person_ids: vec![hank.id],
            },
        )
        .await
        .unwrap();
    let ids: Vec<_> = candidates.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![hanky.id]);

    let everyone = t
        .larder
        .collaboration
        .list_candidates(&package.reference(), &CandidateQuery::default())
        .await
        .unwrap();
    let ids: Vec<_> = everyone.iter().map(|p| p.id).collect();
    assert!(!ids.contains(&hank_sr.id));
    assert!(ids.contains(&jim.id));
    assert_eq!(ids.len(), 3);

    t.cleanup().await;
}

#[tokio::test]
async fn concurrent_adds_of_one_person_create_a_single_row() {
    let mut t = common::spawn("collab-concurrent-add").await;
    let fanny = t.person("Fanny").await;
    let jim = t.person("Jim").await;
    let package = t
        .larder
        .collaboration
        .create_resource(ResourceKind::Package, "redis", fanny.id)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let collaboration = t.larder.collaboration.clone();
        let req = request(package.reference(), vec![jim.id], vec![]);
        let owner = fanny.id;
        handles.push(tokio::spawn(async move {
            collaboration.create_collaborators(owner, &req).await
        }));
    }

    let mut created = 0;
    for handle in handles {
        let rows = handle.await.unwrap().expect("duplicate adds are not errors");
        created += rows.len();
    }
    assert_eq!(created, 1);

    let rows = t
        .larder
        .collaboration
        .collaborators(&package.reference())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].person_id, jim.id);
    assert_eq!(t.queued_notifications().len(), 1);

    t.cleanup().await;
}

#[tokio::test]
async fn transfer_racing_adds_never_lists_the_new_owner_as_collaborator() {
    let t = common::spawn("collab-concurrent-transfer").await;
    let fanny = t.person("Fanny").await;
    let hank = t.person("Hank").await;
    let package = t
        .larder
        .collaboration
        .create_resource(ResourceKind::Package, "redis", fanny.id)
        .await
        .unwrap();
    let hank_row = t
        .larder
        .collaboration
        .create_collaborators(fanny.id, &request(package.reference(), vec![hank.id], vec![]))
        .await
        .unwrap()[0]
        .id;

    // Both the outgoing and the incoming owner keep trying to add Hank.
    let mut adds = Vec::new();
    for i in 0..19 {
        let collaboration = t.larder.collaboration.clone();
        let acting = if i % 2 == 0 { fanny.id } else { hank.id };
        let req = request(package.reference(), vec![hank.id], vec![]);
        adds.push(tokio::spawn(async move {
            collaboration.create_collaborators(acting, &req).await
        }));
    }
    let collaboration = t.larder.collaboration.clone();
    let owner = fanny.id;
    let transfer =
        tokio::spawn(async move { collaboration.transfer_ownership(owner, hank_row).await });

    let updated = transfer.await.unwrap().unwrap();
    assert_eq!(updated.owner_id, hank.id);

    for add in adds {
        match add.await.unwrap() {
            Ok(rows) => assert!(rows.is_empty(), "unexpected rows {rows:?}"),
            Err(LarderError::Forbidden(_)) => {}
            Err(err) => panic!("unexpected error {err:?}"),
        }
    }

    let resource = t
        .larder
        .collaboration
        .resource(&package.reference())
        .await
        .unwrap();
    assert_eq!(resource.owner_id, hank.id);
    let rows = t
        .larder
        .collaboration
        .collaborators(&package.reference())
        .await
        .unwrap();
    assert!(rows.iter().all(|c| c.person_id != resource.owner_id));
    assert!(rows.is_empty());

    t.cleanup().await;
}

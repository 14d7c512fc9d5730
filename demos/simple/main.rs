use std::collections::HashMap;

use attribution_core::{
    AttributionQuery, Attributor, EventType, UserEventInfo, UserSessionData,
};

const DAY: i64 = 86_400;

pub fn main() -> attribution_core::Result<()> {
    env_logger::init();

    let query = AttributionQuery::from_json(
        r#"{
            "query_type": "ConversionBased",
            "attribution_methodology": "Time_Decay",
            "attribution_methodology_c": "Last_Touch_ND",
            "attribution_key": "Source",
            "lbw": 30
        }"#,
    )?;
    let attributor = Attributor::new(query)?;

    let sessions = HashMap::from([(
        "user-1".to_owned(),
        HashMap::from([
            ("google".to_owned(), UserSessionData::from_timestamps(vec![2 * DAY, 9 * DAY])),
            ("newsletter".to_owned(), UserSessionData::from_timestamps(vec![6 * DAY])),
            ("$none".to_owned(), UserSessionData::from_timestamps(vec![10 * DAY])),
        ]),
    )]);
    let users = [UserEventInfo {
        coal_user_id: "user-1".to_owned(),
        event_name: "purchase".to_owned(),
        timestamp: 10 * DAY,
        event_type: EventType::Goal,
    }];

    let (primary, compare) =
        attributor.compare_users("purchase", &users, &sessions, &HashMap::new());

    println!("Time_Decay: {:?}", primary.users);
    if let Some(compare) = compare {
        println!("Last_Touch_ND: {:?}", compare.users);
    }
    Ok(())
}

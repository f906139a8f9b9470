diesel::table! {
    drivers (id) {
        id -> Integer,
        name -> Text,
    }
}

diesel::table! {
    events (id) {
        id -> Integer,
        season -> Integer,
        division -> Integer,
        race -> Integer,
        date -> Text,
        track -> Text,
    }
}

diesel::table! {
    results (id) {
        id -> Integer,
        event_id -> Integer,
        driver_id -> Integer,
        class_pos -> Integer,
        car_num -> Integer,
        class -> Text,
        team -> Text,
        car -> Text,
    }
}

diesel::table! {
    stints (id) {
        id -> Integer,
        event_id -> Integer,
        driver_id -> Integer,
        lap_start -> Integer,
        lap_end -> Integer,
    }
}

diesel::table! {
    timing (id) {
        id -> Integer,
        event_id -> Integer,
        driver_id -> Integer,
        lap -> Integer,
        lap_time -> Double,
        fuel -> Double,
    }
}

diesel::joinable!(results -> events (event_id));
diesel::joinable!(results -> drivers (driver_id));
diesel::joinable!(stints -> events (event_id));
diesel::joinable!(stints -> drivers (driver_id));
diesel::joinable!(timing -> events (event_id));
diesel::joinable!(timing -> drivers (driver_id));

diesel::allow_tables_to_appear_in_same_query!(drivers, events, results, stints, timing,);

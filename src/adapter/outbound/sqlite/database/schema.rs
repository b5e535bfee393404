// Diesel schema for the monitor tables. Keep in sync with migrations/.

diesel::table! {
    subscriptions (recipient_id, address) {
        recipient_id -> BigInt,
        address -> Text,
        name -> Text,
    }
}

diesel::table! {
    account_states (address) {
        address -> Text,
        account_value -> Double,
        positions -> Text,
    }
}

diesel::table! {
    authorized_recipients (recipient_id) {
        recipient_id -> BigInt,
    }
}

diesel::allow_tables_to_appear_in_same_query!(account_states, authorized_recipients, subscriptions,);

use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingCreatedEvent {
    pub booking_id: Uuid,
    pub experience_id: Uuid,
    pub winery_id: Uuid,
    pub guest_id: Uuid,
    pub slot_date: chrono::NaiveDate,
    pub time_slot: String,
    pub guests: i32,
    pub total_amount: i64,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingStatusChangedEvent {
    pub booking_id: Uuid,
    pub experience_id: Uuid,
    pub previous_status: String,
    pub new_status: String,
    pub actor: String,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct WinerySubmittedEvent {
    pub winery_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub region: String,
    pub timestamp: i64,
}

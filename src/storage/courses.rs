use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::Course;
use super::tables::*;

impl Database {
    // ========================================================================
    // Course operations
    // ========================================================================

    /// Insert or replace a course, keyed by code
    pub fn put_course(&self, course: &Course) -> Result<(), DatabaseError> {
        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(COURSES)?;
            let data = bincode::serialize(course)?;
            table.insert(course.code.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a course by code
    pub fn get_course(&self, code: &str) -> Result<Option<Course>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(COURSES)?;

        match table.get(code)? {
            Some(data) => Ok(Some(bincode::deserialize(data.value())?)),
            None => Ok(None),
        }
    }

    /// All courses, ordered by code (redb iterates keys in order)
    pub fn all_courses(&self) -> Result<Vec<Course>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(COURSES)?;

        let mut courses = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let course: Course = bincode::deserialize(value.value())?;
            courses.push(course);
        }

        Ok(courses)
    }
}

#[cfg(test)]
mod tests {
    use crate::testutil::{make_course, setup_db};

    #[test]
    fn test_put_and_get_course() {
        let (db, _temp) = setup_db();
        db.put_course(&make_course("CSC101", "Intro to Programming")).unwrap();

        let course = db.get_course("CSC101").unwrap().unwrap();
        assert_eq!(course.name, "Intro to Programming");
        assert!(db.get_course("CSC999").unwrap().is_none());
    }

    #[test]
    fn test_all_courses_ordered_by_code() {
        let (db, _temp) = setup_db();
        db.put_course(&make_course("CSC301", "Algorithms")).unwrap();
        db.put_course(&make_course("CSC101", "Intro to Programming")).unwrap();
        db.put_course(&make_course("CSC201", "Data Structures")).unwrap();

        let codes: Vec<String> = db
            .all_courses()
            .unwrap()
            .into_iter()
            .map(|c| c.code)
            .collect();
        assert_eq!(codes, vec!["CSC101", "CSC201", "CSC301"]);
    }
}
